// src/noyau/fournisseur.rs
//
// Fournisseur de chiffres (pur, sans état, sans I/O)
// --------------------------------------------------
// developpe(c, n) -> exactement n chiffres fractionnaires, tous justes (troncature).
//
// Calcul à n + CHIFFRES_DE_GARDE chiffres (+ marge absorbant l’erreur des séries),
// puis on jette la queue. Si l’encadrement chevauche une frontière (longue suite
// de 9 ou de 0 dans le vrai développement), on élargit la garde et on recommence.

use super::constante::Constante;
use super::erreur::{non_negatif, ErreurNoyau, Result};
use super::lecture::fraction_decimale;

/// Chiffres de garde au-delà de la précision demandée.
/// 1 ne suffit pas : une retenue peut remonter sur toute une suite de 9.
pub const CHIFFRES_DE_GARDE: usize = 2;

/// Plus grand développement accepté : les puissances de 10 (jusqu’à 10^(2·W) pour
/// les racines) doivent garder un exposant u32.
pub const CHIFFRES_MAX: usize = 100_000_000;

/// Chiffres rongés par l’erreur cumulée des séries (≈ 23·n unités pour π).
fn marge_serie(n: usize) -> usize {
    n.max(1).ilog10() as usize + 3
}

/// API publique : n chiffres fractionnaires de `constante`.
/// n = 0 -> chaîne vide (le chiffre entier vient du registre).
pub fn developpe(constante: Constante, n: i64) -> Result<String> {
    let n = non_negatif(n, "nombre de chiffres")?;
    let n = usize::try_from(n)
        .ok()
        .filter(|&n| n <= CHIFFRES_MAX)
        .ok_or_else(|| {
            ErreurNoyau::ArgumentInvalide(format!(
                "nombre de chiffres trop grand ({n} > {CHIFFRES_MAX})"
            ))
        })?;
    Ok(chiffres_fractionnaires(constante, n))
}

/// Variante par nom (constante inconnue -> erreur).
pub fn developpe_nom(nom: &str, n: i64) -> Result<String> {
    developpe(nom.parse()?, n)
}

pub(crate) fn chiffres_fractionnaires(constante: Constante, n: usize) -> String {
    if n == 0 {
        return String::new();
    }

    let marge = marge_serie(n);
    let mut garde = CHIFFRES_DE_GARDE;

    loop {
        let enc = constante.encadrement(n + garde + marge);
        if let Some(tronque) = enc.tronque(garde + marge) {
            return fraction_decimale(&tronque, n);
        }

        tracing::debug!(
            constante = %constante,
            n,
            garde,
            "encadrement ambigu, garde élargie"
        );
        garde *= 2;
    }
}
