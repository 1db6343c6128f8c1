// src/noyau/stockage.rs
//
// Stockage persistant
// -------------------
// Deux contrats, un par composant :
// - DepotChiffres : suite de chiffres par constante + haut niveau (écrits ensemble)
// - DepotCurseurs : une ligne (sujet, constante) -> position, avance atomique
//
// Implémentations :
// - memoire.rs : tables en mémoire (tests, usage éphémère)
// - sqlite.rs  : fichier SQLite, transactions

pub mod memoire;
pub mod sqlite;

pub use memoire::Memoire;
pub use sqlite::Sqlite;

use super::constante::Constante;
use super::erreur::{ErreurNoyau, Result};

/// Les positions tiennent dans un entier SQL signé.
pub const POSITION_MAX: u64 = i64::MAX as u64;

pub(crate) fn verifie_position(position: u64) -> Result<u64> {
    if position > POSITION_MAX {
        return Err(ErreurNoyau::ArgumentInvalide(format!(
            "position {position} > {POSITION_MAX}"
        )));
    }
    Ok(position)
}

/// Position après une avance de `quantite`, au plus `fin_max` (et POSITION_MAX).
/// Une avance nulle est toujours acceptée.
pub(crate) fn position_suivante(position: u64, quantite: u64, fin_max: u64) -> Result<u64> {
    if quantite == 0 {
        return Ok(position);
    }

    let suivante = position.checked_add(quantite).ok_or_else(|| {
        ErreurNoyau::ArgumentInvalide(format!(
            "débordement de position ({position} + {quantite})"
        ))
    })?;
    if suivante > fin_max {
        return Err(ErreurNoyau::ArgumentInvalide(format!(
            "lecture jusqu’à {suivante} > {fin_max}"
        )));
    }
    verifie_position(suivante)
}

pub trait DepotChiffres: Send + Sync {
    /// Suite stockée, indices 0..longueur, sans trou.
    fn charger(&self, constante: Constante) -> Result<String>;

    /// Ajoute `chiffres` aux indices `debut..` et avance le haut niveau,
    /// tout ou rien. `debut` doit être la longueur stockée actuelle.
    fn ajouter(&self, constante: Constante, debut: u64, chiffres: &str) -> Result<()>;

    /// Remise à zéro administrative de toute la suite.
    fn vider(&self, constante: Constante) -> Result<()>;
}

pub trait DepotCurseurs: Send + Sync {
    /// 0 si aucune ligne n’existe (aucune ligne n’est créée).
    fn position(&self, sujet: &str, constante: Constante) -> Result<u64>;

    /// position <- position + quantite, atomiquement. Retourne la position AVANT.
    /// Refusée, sans rien modifier, si la nouvelle position dépasserait `fin_max`.
    fn avancer(
        &self,
        sujet: &str,
        constante: Constante,
        quantite: u64,
        fin_max: u64,
    ) -> Result<u64>;

    fn fixer(&self, sujet: &str, constante: Constante, position: u64) -> Result<()>;

    /// Supprime toutes les lignes du sujet. Retourne le nombre de lignes supprimées.
    fn supprimer_sujet(&self, sujet: &str) -> Result<usize>;

    /// Toutes les positions à 0 (tous sujets, toutes constantes).
    fn tout_remettre_a_zero(&self) -> Result<()>;
}
