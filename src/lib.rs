//! Chiffres de π, e et √2 servis à la demande.
//!
//! - `noyau` : développement, cache persistant, curseurs par sujet
//! - `app`   : configuration, rendu texte, ligne de commande

pub mod app;
pub mod noyau;

pub use noyau::{Constante, ErreurNoyau, Limites, ServiceChiffres};
