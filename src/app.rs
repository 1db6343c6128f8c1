// src/app.rs
//
// Couche application (autour du noyau)
// ------------------------------------
// - config.rs : fichier TOML + variables d’environnement -> Limites + dépôt
// - cli.rs    : sous-commandes clap -> appels du service
// - vue.rs    : rendu texte (virgule, listes, résumé du cache)

pub mod cli;
pub mod config;
pub mod vue;

pub use cli::{code_sortie, executer, Cli, Commande};
pub use config::{Config, ErreurConfig};
