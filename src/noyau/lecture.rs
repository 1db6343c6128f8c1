// src/noyau/lecture.rs
//
// Lecture décimale en entiers “scalés”
// ------------------------------------
// Une valeur x est représentée par un entier ≈ x·10^W (W = précision de travail).
// Chaque calcul rend un ENCADREMENT [bas, haut] qui contient floor(x·10^W) :
// les séries tronquées accumulent une erreur bornée, et c’est la borne (pas une
// estimation) qui permet au fournisseur de certifier ses chiffres.
//
// - π  : Machin, 16·atan(1/5) − 4·atan(1/239)
// - e  : Σ 1/k!
// - √r : Newton entier (exact, bas == haut)

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/* ------------------------ Outils ------------------------ */

/// 10^n ; n est borné en amont (CHIFFRES_MAX), bien en deçà de u32::MAX.
pub fn pow10(n: usize) -> BigInt {
    debug_assert!(u32::try_from(n).is_ok(), "exposant {n} hors de u32");
    BigInt::from(10u32).pow(n as u32)
}

/// floor(x·10^W) ∈ [bas, haut]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encadrement {
    pub bas: BigInt,
    pub haut: BigInt,
}

impl Encadrement {
    fn exact(v: BigInt) -> Self {
        Self {
            bas: v.clone(),
            haut: v,
        }
    }

    /// Tronque les deux bornes de `garde` chiffres.
    /// Some(v) seulement si elles tombent sur la même valeur.
    pub fn tronque(&self, garde: usize) -> Option<BigInt> {
        let d = pow10(garde);
        let bas = &self.bas / &d;
        let haut = &self.haut / &d;
        (bas == haut).then_some(bas)
    }
}

/// Partie fractionnaire d’un entier scalé (×10^digits), sans séparateur,
/// complétée à gauche par des zéros.
pub fn fraction_decimale(scaled: &BigInt, digits: usize) -> String {
    if digits == 0 {
        return String::new();
    }

    let frac = (scaled.abs() % pow10(digits)).to_str_radix(10);
    let mut out = String::with_capacity(digits);
    for _ in frac.len()..digits {
        out.push('0');
    }
    out.push_str(&frac);
    out
}

/* ------------------------ π (Machin) ------------------------ */

/// arctan(1/q) en entier scalé (troncature) via série:
/// atan(z) = z - z^3/3 + z^5/5 - ...
///
/// `puissance` = floor(scale / q^(2k+1)) se tient à jour par division par q²
/// (entier machine) : floor(floor(a/b)/c) == floor(a/(bc)), donc elle reste exacte.
/// Chaque terme puissance/(2k+1) est alors tronqué de moins de 2 unités ; le reste
/// de la série alternée est < 1 dès que la puissance tombe à 0.
///
/// Retourne la somme et l’erreur maximale (en unités de 10^-W).
fn arctan_inv_q_scaled(q: u32, scale: &BigInt) -> (BigInt, usize) {
    let q2 = q * q;

    let mut puissance = scale / q;
    let mut sum = BigInt::zero();
    let mut k: u64 = 0;

    while !puissance.is_zero() {
        let term = &puissance / (2 * k + 1);
        if k % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }

        puissance /= q2;
        k += 1;
    }

    (sum, 2 * k as usize + 1)
}

pub fn pi_encadre(digits: usize) -> Encadrement {
    let scale = pow10(digits);

    let (a, erreur_a) = arctan_inv_q_scaled(5, &scale);
    let (b, erreur_b) = arctan_inv_q_scaled(239, &scale);

    let pi = BigInt::from(16) * a - BigInt::from(4) * b;
    let erreur = BigInt::from(16 * erreur_a + 4 * erreur_b);

    Encadrement {
        bas: &pi - &erreur,
        haut: pi + erreur,
    }
}

/* ------------------------ e (série factorielle) ------------------------ */

/// Chaque terme scale/k! est calculé par division tronquée du précédent :
/// il sous-estime la valeur vraie de moins de 2 unités. La somme est donc
/// toujours par défaut, d’au plus 2 par terme (+ reste de la série).
pub fn e_encadre(digits: usize) -> Encadrement {
    let mut term = pow10(digits);
    let mut sum = BigInt::zero();
    let mut k: usize = 0;

    while !term.is_zero() {
        sum += &term;
        k += 1;
        term /= BigInt::from(k as u64);
    }

    let erreur = BigInt::from(2 * k + 4);
    Encadrement {
        haut: &sum + erreur,
        bas: sum,
    }
}

/* ------------------------ √ (Newton entier) ------------------------ */

/// floor(sqrt(n)) pour n ≥ 0.
/// Départ au-dessus de la racine : la suite de Newton décroît jusqu’au plancher.
fn racine_entiere(n: &BigInt) -> BigInt {
    if n.is_zero() {
        return BigInt::zero();
    }

    let mut y = BigInt::one() << ((n.bits() / 2 + 1) as usize);
    loop {
        let y_next = (&y + n / &y) >> 1usize;
        if y_next >= y {
            return y;
        }
        y = y_next;
    }
}

/// sqrt(r) en entier scalé : floor( sqrt(r) * 10^digits ), r = n/d ≥ 0.
/// floor(sqrt(floor(z))) == floor(sqrt(z)) : la division entière ne perd rien.
pub fn rational_sqrt_scaled(r: &BigRational, digits: usize) -> Encadrement {
    if !r.is_positive() {
        return Encadrement::exact(BigInt::zero());
    }

    let target = (r.numer() * pow10(2 * digits)) / r.denom();
    Encadrement::exact(racine_entiere(&target))
}
