// src/noyau/stockage/memoire.rs
//
// Stockage en mémoire (rien ne survit au processus).
// Curseurs : une cellule atomique par (sujet, constante) ; le verrou de la table
// ne sert qu’à trouver/créer la cellule, jamais à l’incrément lui-même.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::{position_suivante, verifie_position, DepotChiffres, DepotCurseurs};
use crate::noyau::constante::Constante;
use crate::noyau::erreur::{ErreurNoyau, Result};

type Cle = (String, Constante);

#[derive(Default)]
pub struct Memoire {
    chiffres: Mutex<HashMap<Constante, String>>,
    curseurs: RwLock<HashMap<Cle, Arc<AtomicU64>>>,
}

impl Memoire {
    pub fn new() -> Self {
        Self::default()
    }

    fn cellule(&self, sujet: &str, constante: Constante) -> Arc<AtomicU64> {
        let cle = (sujet.to_string(), constante);
        {
            let table = self.curseurs.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = table.get(&cle) {
                return Arc::clone(c);
            }
        }

        let mut table = self.curseurs.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(table.entry(cle).or_default())
    }
}

impl DepotChiffres for Memoire {
    fn charger(&self, constante: Constante) -> Result<String> {
        let table = self.chiffres.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(table.get(&constante).cloned().unwrap_or_default())
    }

    fn ajouter(&self, constante: Constante, debut: u64, chiffres: &str) -> Result<()> {
        let mut table = self.chiffres.lock().unwrap_or_else(PoisonError::into_inner);
        let suite = table.entry(constante).or_default();

        if suite.len() as u64 != debut {
            return Err(ErreurNoyau::StockageIndisponible(format!(
                "écriture non contiguë pour {constante} : longueur {}, début {debut}",
                suite.len()
            )));
        }

        suite.push_str(chiffres);
        Ok(())
    }

    fn vider(&self, constante: Constante) -> Result<()> {
        let mut table = self.chiffres.lock().unwrap_or_else(PoisonError::into_inner);
        table.remove(&constante);
        Ok(())
    }
}

impl DepotCurseurs for Memoire {
    fn position(&self, sujet: &str, constante: Constante) -> Result<u64> {
        let table = self.curseurs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(table
            .get(&(sujet.to_string(), constante))
            .map_or(0, |c| c.load(Ordering::SeqCst)))
    }

    fn avancer(
        &self,
        sujet: &str,
        constante: Constante,
        quantite: u64,
        fin_max: u64,
    ) -> Result<u64> {
        let cellule = self.cellule(sujet, constante);

        let mut erreur = None;
        let avant = cellule.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |p| {
            match position_suivante(p, quantite, fin_max) {
                Ok(suivante) => Some(suivante),
                Err(e) => {
                    erreur = Some(e);
                    None
                }
            }
        });

        match (avant, erreur) {
            (Ok(p), _) => Ok(p),
            (Err(_), Some(e)) => Err(e),
            (Err(p), None) => Err(ErreurNoyau::ArgumentInvalide(format!(
                "avance refusée à la position {p}"
            ))),
        }
    }

    fn fixer(&self, sujet: &str, constante: Constante, position: u64) -> Result<()> {
        let position = verifie_position(position)?;
        self.cellule(sujet, constante)
            .store(position, Ordering::SeqCst);
        Ok(())
    }

    fn supprimer_sujet(&self, sujet: &str) -> Result<usize> {
        let mut table = self.curseurs.write().unwrap_or_else(PoisonError::into_inner);
        let avant = table.len();
        table.retain(|(s, _), _| s != sujet);
        Ok(avant - table.len())
    }

    fn tout_remettre_a_zero(&self) -> Result<()> {
        let table = self.curseurs.read().unwrap_or_else(PoisonError::into_inner);
        for cellule in table.values() {
            cellule.store(0, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::stockage::contrat;

    #[test]
    fn contrat_chiffres() {
        contrat::chiffres(&Memoire::new());
    }

    #[test]
    fn contrat_curseurs() {
        contrat::curseurs(&Memoire::new());
    }

    #[test]
    fn lecture_ne_cree_pas_de_ligne() {
        let m = Memoire::new();
        m.position("fantome", Constante::Pi).unwrap();
        assert_eq!(m.supprimer_sujet("fantome").unwrap(), 0);
    }
}
