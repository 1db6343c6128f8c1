// src/noyau/constante.rs
//
// Registre des constantes
// -----------------------
// Ensemble fermé : (nom, chiffre entier, calcul scalé). Ajouter une constante =
// ajouter une variante + une entrée dans REGISTRE.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;

use super::erreur::ErreurNoyau;
use super::lecture::{e_encadre, pi_encadre, rational_sqrt_scaled, Encadrement};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constante {
    Pi,
    E,
    Sqrt2,
}

struct Definition {
    nom: &'static str,
    premier_chiffre: char,
    calcul: fn(usize) -> Encadrement,
}

fn sqrt2_encadre(digits: usize) -> Encadrement {
    rational_sqrt_scaled(&BigRational::from_integer(BigInt::from(2)), digits)
}

static REGISTRE: [Definition; 3] = [
    Definition {
        nom: "pi",
        premier_chiffre: '3',
        calcul: pi_encadre,
    },
    Definition {
        nom: "e",
        premier_chiffre: '2',
        calcul: e_encadre,
    },
    Definition {
        nom: "sqrt2",
        premier_chiffre: '1',
        calcul: sqrt2_encadre,
    },
];

impl Constante {
    pub const TOUTES: [Constante; 3] = [Constante::Pi, Constante::E, Constante::Sqrt2];

    fn definition(self) -> &'static Definition {
        &REGISTRE[self as usize]
    }

    pub fn nom(self) -> &'static str {
        self.definition().nom
    }

    /// Chiffre d’indice 0 (avant la virgule), connu sans calcul.
    pub fn premier_chiffre(self) -> char {
        self.definition().premier_chiffre
    }

    /// Encadrement de floor(x·10^digits).
    pub(crate) fn encadrement(self, digits: usize) -> Encadrement {
        (self.definition().calcul)(digits)
    }

    pub(crate) fn indice(self) -> usize {
        self as usize
    }
}

impl FromStr for Constante {
    type Err = ErreurNoyau;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Constante::TOUTES
            .into_iter()
            .find(|c| c.nom() == s)
            .ok_or_else(|| ErreurNoyau::ConstanteInconnue(s.to_string()))
    }
}

impl fmt::Display for Constante {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noms_et_premiers_chiffres() {
        let vus: Vec<(&str, char)> = Constante::TOUTES
            .iter()
            .map(|c| (c.nom(), c.premier_chiffre()))
            .collect();
        assert_eq!(vus, vec![("pi", '3'), ("e", '2'), ("sqrt2", '1')]);
    }

    #[test]
    fn lecture_du_nom() {
        assert_eq!("pi".parse::<Constante>().unwrap(), Constante::Pi);
        assert_eq!("sqrt2".parse::<Constante>().unwrap(), Constante::Sqrt2);
        assert_eq!(Constante::E.to_string(), "e");

        for inconnu in ["cat", "PI", "", "four"] {
            let err = inconnu.parse::<Constante>().unwrap_err();
            assert!(matches!(err, ErreurNoyau::ConstanteInconnue(n) if n == inconnu));
        }
    }
}
