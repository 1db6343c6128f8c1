// src/app/config.rs
//
// Configuration
// -------------
// Où vivent les chiffres et les curseurs, et combien de travail une requête
// peut déclencher.
// Priorité : valeurs par défaut < fichier TOML < variables d’environnement.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::noyau::cache::{INDICE_MAX_DEFAUT, PAS_EXTENSION_DEFAUT};
use crate::noyau::{self, Limites, ServiceChiffres};

/// Filtre de journal par défaut (remplacé par RUST_LOG s’il est défini).
const JOURNAL_DEFAUT: &str = "chiffres_irrationnels=info";

/// Garde-fou : au-delà, une seule extension de π dépasse la minute.
const INDICE_MAX_PLAFOND: u64 = 1_000_000;

pub const VAR_BASE: &str = "CHIFFRES_BASE";
pub const VAR_INDICE_MAX: &str = "CHIFFRES_INDICE_MAX";
pub const VAR_PAS_EXTENSION: &str = "CHIFFRES_PAS_EXTENSION";

#[derive(Error, Debug)]
pub enum ErreurConfig {
    #[error("lecture de {chemin} : {source}")]
    Lecture {
        chemin: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration TOML invalide : {0}")]
    Format(#[from] toml::de::Error),

    #[error("{nom} invalide : {valeur:?}")]
    Variable { nom: &'static str, valeur: String },

    #[error("{0}")]
    Valeur(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base SQLite ; None => tout en mémoire.
    pub base: Option<PathBuf>,
    pub indice_max: u64,
    pub pas_extension: u64,
    pub journal: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base: None,
            indice_max: INDICE_MAX_DEFAUT,
            pas_extension: PAS_EXTENSION_DEFAUT,
            journal: JOURNAL_DEFAUT.to_string(),
        }
    }
}

impl Config {
    /// Fichier (optionnel) puis environnement du processus.
    pub fn charger(chemin: Option<&Path>) -> Result<Self, ErreurConfig> {
        let mut config = match chemin {
            Some(p) => {
                let texte = std::fs::read_to_string(p).map_err(|source| ErreurConfig::Lecture {
                    chemin: p.to_path_buf(),
                    source,
                })?;
                Self::depuis_toml(&texte)?
            }
            None => Self::default(),
        };

        config.appliquer_env(|nom| std::env::var(nom).ok())?;
        config.valider()?;
        Ok(config)
    }

    pub fn depuis_toml(texte: &str) -> Result<Self, ErreurConfig> {
        Ok(toml::from_str(texte)?)
    }

    fn appliquer_env(&mut self, lire: impl Fn(&str) -> Option<String>) -> Result<(), ErreurConfig> {
        if let Some(v) = lire(VAR_BASE) {
            self.base = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = lire(VAR_INDICE_MAX) {
            self.indice_max = entier(VAR_INDICE_MAX, v)?;
        }
        if let Some(v) = lire(VAR_PAS_EXTENSION) {
            self.pas_extension = entier(VAR_PAS_EXTENSION, v)?;
        }
        Ok(())
    }

    fn valider(&self) -> Result<(), ErreurConfig> {
        if self.pas_extension == 0 {
            return Err(ErreurConfig::Valeur("pas_extension doit être ≥ 1".into()));
        }
        if self.indice_max > INDICE_MAX_PLAFOND {
            return Err(ErreurConfig::Valeur(format!(
                "indice_max {} > {INDICE_MAX_PLAFOND}",
                self.indice_max
            )));
        }
        Ok(())
    }

    pub fn limites(&self) -> Limites {
        Limites {
            indice_max: self.indice_max,
            pas_extension: self.pas_extension,
        }
    }

    pub fn ouvrir_service(&self) -> noyau::Result<ServiceChiffres> {
        match &self.base {
            Some(chemin) => ServiceChiffres::sqlite(chemin, self.limites()),
            None => {
                tracing::warn!("aucune base configurée : chiffres et curseurs en mémoire");
                ServiceChiffres::en_memoire(self.limites())
            }
        }
    }
}

fn entier(nom: &'static str, valeur: String) -> Result<u64, ErreurConfig> {
    valeur
        .trim()
        .parse()
        .map_err(|_| ErreurConfig::Variable { nom, valeur })
}
