//! Noyau : chiffres de constantes irrationnelles
//!
//! Organisation interne :
//! - constante.rs   : registre (nom, chiffre entier, calcul)
//! - lecture.rs     : entiers scalés + encadrements (Machin, Σ1/k!, Newton)
//! - fournisseur.rs : n chiffres fractionnaires justes (garde de troncature)
//! - stockage.rs    : dépôts persistants (mémoire, SQLite)
//! - cache.rs       : suite sans trou par constante, extension sérialisée
//! - curseurs.rs    : position de lecture par (sujet, constante)
//! - service.rs     : les requêtes (indice, plage, suivants, remise à zéro)
//! - erreur.rs      : constante inconnue / argument invalide / stockage

pub mod cache;
pub mod constante;
pub mod curseurs;
pub mod erreur;
pub mod fournisseur;
pub mod lecture;
pub mod service;
pub mod stockage;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_concurrence;

// API publique minimale
pub use cache::Limites;
pub use constante::Constante;
pub use erreur::{ErreurNoyau, Result};
pub use fournisseur::{developpe, CHIFFRES_DE_GARDE, CHIFFRES_MAX};
pub use service::{Livraison, ServiceChiffres};
