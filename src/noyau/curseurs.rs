// src/noyau/curseurs.rs
//
// Curseurs de lecture (sujet, constante) -> prochaine position à lire.
// Le sujet appartient au système d’identité externe : le noyau ne vérifie pas
// son existence, mais supprimer un sujet supprime TOUS ses curseurs (un sujet
// recréé sous le même nom repart de 0).

use std::sync::Arc;

use super::constante::Constante;
use super::erreur::{non_negatif, Result};
use super::stockage::DepotCurseurs;

pub struct Curseurs {
    depot: Arc<dyn DepotCurseurs>,
}

impl Curseurs {
    pub fn new(depot: Arc<dyn DepotCurseurs>) -> Self {
        Self { depot }
    }

    /// Position courante ; 0 pour un sujet jamais vu.
    pub fn position(&self, sujet: &str, constante: Constante) -> Result<u64> {
        self.depot.position(sujet, constante)
    }

    /// Avance atomique ; retourne la position AVANT l’avance.
    /// Deux avances concurrentes ne voient jamais la même position de départ, et
    /// aucune ne laisse le curseur au-delà de `fin_max`.
    pub fn avancer(
        &self,
        sujet: &str,
        constante: Constante,
        quantite: i64,
        fin_max: u64,
    ) -> Result<u64> {
        let quantite = non_negatif(quantite, "quantité")?;
        self.depot.avancer(sujet, constante, quantite, fin_max)
    }

    pub fn reinitialiser(&self, sujet: &str, constante: Constante) -> Result<()> {
        self.depot.fixer(sujet, constante, 0)
    }

    pub fn fixer(&self, sujet: &str, constante: Constante, position: i64) -> Result<()> {
        let position = non_negatif(position, "position")?;
        self.depot.fixer(sujet, constante, position)
    }

    /// À appeler par celui qui supprime le sujet.
    pub fn supprimer_sujet(&self, sujet: &str) -> Result<usize> {
        let n = self.depot.supprimer_sujet(sujet)?;
        tracing::info!(sujet, curseurs = n, "sujet supprimé");
        Ok(n)
    }

    pub fn tout_reinitialiser(&self) -> Result<()> {
        self.depot.tout_remettre_a_zero()?;
        tracing::info!("tous les curseurs remis à zéro");
        Ok(())
    }
}
