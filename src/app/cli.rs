// src/app/cli.rs
//
// Ligne de commande
// -----------------
// Une sous-commande par requête du service. Les nombres sont lus signés :
// un indice négatif doit arriver jusqu’au noyau, qui le refuse avec son propre
// message (même chemin d’erreur que pour tout autre appelant).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::vue;
use crate::noyau::{self, ErreurNoyau, ServiceChiffres};

#[derive(Parser, Debug)]
#[command(name = "chiffres_irrationnels")]
#[command(about = "Chiffres de π, e et √2 : accès direct et lecture séquentielle par sujet")]
#[command(version)]
pub struct Cli {
    /// Fichier de configuration TOML
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub commande: Commande,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commande {
    /// Chiffre à l’indice donné (0 = chiffre entier)
    Chiffre {
        constante: String,
        #[arg(allow_negative_numbers = true)]
        indice: i64,
    },

    /// `nombre` chiffres à partir de `debut`
    Plage {
        constante: String,
        #[arg(allow_negative_numbers = true)]
        debut: i64,
        #[arg(allow_negative_numbers = true)]
        nombre: i64,
    },

    /// Les chiffres suivants d’un sujet (le curseur avance)
    Suivants {
        sujet: String,
        constante: String,
        #[arg(allow_negative_numbers = true)]
        nombre: i64,
    },

    /// Remet le curseur d’un sujet à zéro
    Reinit { sujet: String, constante: String },

    /// Place le curseur d’un sujet
    Fixer {
        sujet: String,
        constante: String,
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },

    /// Position courante d’un sujet
    Position { sujet: String, constante: String },

    /// Supprime tous les curseurs d’un sujet
    SupprimerSujet { sujet: String },

    /// Vide le cache d’une constante
    ViderCache { constante: String },

    /// Remet tous les curseurs à zéro
    ReinitTout,

    /// État du cache d’une constante
    Cache {
        constante: String,
        /// Nombre de chiffres affichés
        #[arg(long, default_value_t = 20)]
        apercu: usize,
    },

    /// Constantes servies
    Constantes,
}

/// Exécute une commande et rend le texte à afficher.
pub fn executer(service: &ServiceChiffres, commande: &Commande) -> noyau::Result<String> {
    use Commande::*;

    let sortie = match commande {
        Chiffre { constante, indice } => service.chiffre_a(constante, *indice)?.to_string(),

        Plage {
            constante,
            debut,
            nombre,
        } => {
            let chiffres = service.chiffres_dans(constante, *debut, *nombre)?;
            // debut >= 0 ici : le service l’a déjà vérifié
            vue::avec_virgule(debut.unsigned_abs(), &chiffres)
        }

        Suivants {
            sujet,
            constante,
            nombre,
        } => vue::livraison(&service.lire_suivants(sujet, constante, *nombre)?),

        Reinit { sujet, constante } => {
            service.reinitialiser_sujet(sujet, constante)?;
            format!("{sujet}/{constante} : position 0")
        }

        Fixer {
            sujet,
            constante,
            position,
        } => {
            service.fixer_position(sujet, constante, *position)?;
            format!("{sujet}/{constante} : position {position}")
        }

        Position { sujet, constante } => service.position_sujet(sujet, constante)?.to_string(),

        SupprimerSujet { sujet } => {
            let n = service.supprimer_sujet(sujet)?;
            format!("{sujet} : {n} curseur(s) supprimé(s)")
        }

        ViderCache { constante } => {
            service.vider_cache(constante)?;
            format!("{constante} : cache vidé")
        }

        ReinitTout => {
            service.reinitialiser_tous_les_curseurs()?;
            "tous les curseurs à zéro".to_string()
        }

        Cache { constante, apercu } => {
            let suite = service.chiffres_en_cache(constante)?;
            vue::resume_cache(constante, &suite, *apercu)
        }

        Constantes => vue::liste_constantes(&ServiceChiffres::constantes()),
    };

    Ok(sortie)
}

/// Code de sortie du processus selon la famille d’erreur.
pub fn code_sortie(erreur: &ErreurNoyau) -> u8 {
    match erreur {
        ErreurNoyau::ArgumentInvalide(_) => 2,
        ErreurNoyau::ConstanteInconnue(_) => 3,
        ErreurNoyau::StockageIndisponible(_) => 4,
    }
}
