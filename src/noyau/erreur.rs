// src/noyau/erreur.rs
//
// Erreurs du noyau
// ----------------
// Trois familles seulement, toutes synchrones et non réessayées par le noyau :
// - constante inconnue
// - argument hors domaine (indice/quantité négatifs, borne dépassée)
// - stockage indisponible (jamais masqué : le haut niveau en dépend)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErreurNoyau {
    #[error("constante inconnue : {0}")]
    ConstanteInconnue(String),

    #[error("argument invalide : {0}")]
    ArgumentInvalide(String),

    #[error("stockage indisponible : {0}")]
    StockageIndisponible(String),
}

impl From<rusqlite::Error> for ErreurNoyau {
    fn from(e: rusqlite::Error) -> Self {
        ErreurNoyau::StockageIndisponible(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ErreurNoyau>;

/// Convertit un indice/une quantité reçu(e) de l’extérieur (signé) en `u64`.
pub fn non_negatif(valeur: i64, quoi: &str) -> Result<u64> {
    u64::try_from(valeur)
        .map_err(|_| ErreurNoyau::ArgumentInvalide(format!("{quoi} < 0 ({valeur})")))
}
