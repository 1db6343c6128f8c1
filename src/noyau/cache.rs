// src/noyau/cache.rs
//
// Cache de chiffres (un par constante, partagé par tous les lecteurs)
// ------------------------------------------------------------------
// Suite sans trou des indices 0..=H (0 = chiffre avant la virgule).
// - Lecture sous H : verrou de lecture sur la copie en mémoire, jamais le verrou d’extension.
// - Extension : un seul calcul à la fois par constante ; un appelant qui attendait
//   revérifie H et repart sans recalculer si le travail est déjà fait.
// - Les chiffres sont écrits dans le dépôt (avec H) AVANT d’être publiés en mémoire.
// - Écriture refusée (base partagée étendue ou vidée ailleurs) : on relit le dépôt
//   et on repart de sa suite.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use super::constante::Constante;
use super::erreur::{ErreurNoyau, Result};
use super::fournisseur::{chiffres_fractionnaires, CHIFFRES_MAX};
use super::stockage::DepotChiffres;

/// Indice le plus haut qu’une requête peut toucher (anti-abus / anti-gel).
/// Une extension recalcule tout : à 10^5 chiffres, π prend de l’ordre de la seconde.
pub const INDICE_MAX_DEFAUT: u64 = 100_000;

/// Granularité des extensions déclenchées par une lecture.
pub const PAS_EXTENSION_DEFAUT: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limites {
    pub indice_max: u64,
    pub pas_extension: u64,
}

impl Default for Limites {
    fn default() -> Self {
        Self {
            indice_max: INDICE_MAX_DEFAUT,
            pas_extension: PAS_EXTENSION_DEFAUT,
        }
    }
}

pub struct CacheChiffres {
    constante: Constante,
    depot: Arc<dyn DepotChiffres>,
    limites: Limites,
    suite: RwLock<String>,
    extension: Mutex<()>,
}

impl CacheChiffres {
    /// Reprend la suite déjà stockée (vide si rien n’a encore été calculé).
    pub fn ouvrir(
        constante: Constante,
        depot: Arc<dyn DepotChiffres>,
        limites: Limites,
    ) -> Result<Self> {
        let suite = depot.charger(constante)?;

        if let Some(premier) = suite.chars().next() {
            if premier != constante.premier_chiffre() {
                return Err(ErreurNoyau::StockageIndisponible(format!(
                    "suite stockée de {constante} corrompue (commence par {premier:?})"
                )));
            }
        }

        tracing::debug!(constante = %constante, longueur = suite.len(), "cache ouvert");
        Ok(Self {
            constante,
            depot,
            limites,
            suite: RwLock::new(suite),
            extension: Mutex::new(()),
        })
    }

    pub fn constante(&self) -> Constante {
        self.constante
    }

    fn lecture(&self) -> RwLockReadGuard<'_, String> {
        self.suite.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Nombre de chiffres en cache (= H + 1).
    pub fn longueur(&self) -> u64 {
        self.lecture().len() as u64
    }

    /// Haut niveau H ; None tant que rien n’est en cache.
    pub fn haut_niveau(&self) -> Option<u64> {
        self.longueur().checked_sub(1)
    }

    /// Copie de toute la suite en cache.
    pub fn suite(&self) -> String {
        self.lecture().clone()
    }

    /// indice_max, jamais au-delà de ce que le fournisseur accepte.
    fn borne(&self) -> u64 {
        self.limites.indice_max.min(CHIFFRES_MAX as u64)
    }

    /// Position maximale d’un curseur après une avance (dernier indice lisible + 1).
    pub fn fin_max(&self) -> u64 {
        self.borne().saturating_add(1)
    }

    fn verifie_borne(&self, indice: u64) -> Result<()> {
        if indice > self.borne() {
            return Err(ErreurNoyau::ArgumentInvalide(format!(
                "indice {indice} > {} pour {}",
                self.borne(),
                self.constante
            )));
        }
        Ok(())
    }

    /// Cible d’extension pour couvrir `indice` : arrondie au pas, bornée par indice_max.
    fn cible(&self, indice: u64) -> u64 {
        let pas = self.limites.pas_extension.max(1);
        let arrondi = (indice / pas)
            .saturating_add(1)
            .saturating_mul(pas)
            .saturating_sub(1);
        arrondi.min(self.borne()).max(indice)
    }

    fn tranche(&self, debut: u64, fin_exclue: u64) -> Option<String> {
        let suite = self.lecture();
        if fin_exclue > suite.len() as u64 {
            return None;
        }
        Some(suite[debut as usize..fin_exclue as usize].to_string())
    }

    /// Chiffre d’indice `indice`. L’indice 0 ne déclenche jamais de calcul.
    pub fn get(&self, indice: u64) -> Result<char> {
        if indice == 0 {
            return Ok(self.constante.premier_chiffre());
        }

        let s = self.get_range(indice, 1)?;
        s.chars().next().ok_or_else(|| {
            ErreurNoyau::StockageIndisponible(format!("indice {indice} absent après extension"))
        })
    }

    fn dernier_indice(&self, debut: u64, nombre: u64) -> Result<u64> {
        let dernier = debut.checked_add(nombre - 1).ok_or_else(|| {
            ErreurNoyau::ArgumentInvalide(format!("plage hors domaine ({debut} + {nombre})"))
        })?;
        self.verifie_borne(dernier)?;
        Ok(dernier)
    }

    /// `nombre` chiffres consécutifs à partir de `debut`.
    pub fn get_range(&self, debut: u64, nombre: u64) -> Result<String> {
        if nombre == 0 {
            return Ok(String::new());
        }
        let dernier = self.dernier_indice(debut, nombre)?;

        // boucle : un vider() concurrent peut raccourcir la suite entre extension et lecture
        loop {
            if let Some(s) = self.tranche(debut, dernier + 1) {
                return Ok(s);
            }
            self.extend(self.cible(dernier))?;
        }
    }

    /// Garantit que la plage est en cache, sans la lire.
    pub fn couvrir(&self, debut: u64, nombre: u64) -> Result<()> {
        if nombre == 0 {
            return Ok(());
        }
        let dernier = self.dernier_indice(debut, nombre)?;
        if dernier < self.longueur() {
            return Ok(());
        }
        self.extend(self.cible(dernier))
    }

    /// Étend le cache jusqu’à `jusqua` inclus. Idempotent.
    pub fn extend(&self, jusqua: u64) -> Result<()> {
        if jusqua < self.longueur() {
            return Ok(());
        }
        self.verifie_borne(jusqua)?;

        let _garde = self
            .extension
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let longueur = self.longueur();
        if jusqua < longueur {
            return Ok(());
        }

        // Pas de recalcul incrémental : tout le développement jusqu’à `jusqua`.
        let n = jusqua as usize;
        let mut flux = String::with_capacity(n + 1);
        flux.push(self.constante.premier_chiffre());
        flux.push_str(&chiffres_fractionnaires(self.constante, n));

        if !flux.starts_with(self.lecture().as_str()) {
            tracing::error!(constante = %self.constante, longueur, "recalcul différent du cache");
            return Err(ErreurNoyau::StockageIndisponible(format!(
                "cache de {} incohérent avec le recalcul",
                self.constante
            )));
        }

        let nouveaux = &flux[longueur as usize..];
        if let Err(e) = self.depot.ajouter(self.constante, longueur, nouveaux) {
            // Un autre processus a pu étendre ou vider la même base entre-temps.
            tracing::warn!(
                constante = %self.constante,
                erreur = %e,
                "écriture du cache refusée, relecture du dépôt"
            );
            return self.resynchroniser(&flux);
        }

        self.suite
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(nouveaux);

        tracing::info!(
            constante = %self.constante,
            de = longueur,
            a = jusqua,
            "cache étendu"
        );
        Ok(())
    }

    /// Repart de la suite stockée, puis y ajoute ce qui manque de `flux`.
    /// À appeler sous le verrou d’extension.
    fn resynchroniser(&self, flux: &str) -> Result<()> {
        let stockee = self.depot.charger(self.constante)?;

        let coherente = if stockee.len() <= flux.len() {
            flux.starts_with(stockee.as_str())
        } else {
            stockee.starts_with(flux)
        };
        if !coherente {
            tracing::error!(
                constante = %self.constante,
                longueur = stockee.len(),
                "dépôt différent du recalcul"
            );
            return Err(ErreurNoyau::StockageIndisponible(format!(
                "dépôt de {} incohérent avec le recalcul",
                self.constante
            )));
        }

        let mut suite = stockee;
        if suite.len() < flux.len() {
            let debut = suite.len();
            self.depot.ajouter(self.constante, debut as u64, &flux[debut..])?;
            suite.push_str(&flux[debut..]);
        }

        let longueur = suite.len();
        *self.suite.write().unwrap_or_else(PoisonError::into_inner) = suite;

        tracing::info!(constante = %self.constante, longueur, "cache resynchronisé sur le dépôt");
        Ok(())
    }

    /// Remise à zéro administrative (dépôt puis mémoire).
    pub fn vider(&self) -> Result<()> {
        let _garde = self
            .extension
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.depot.vider(self.constante)?;
        self.suite
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        tracing::info!(constante = %self.constante, "cache vidé");
        Ok(())
    }
}

/// Un cache par constante du registre.
pub struct Caches {
    caches: Vec<CacheChiffres>,
}

impl Caches {
    pub fn ouvrir(depot: Arc<dyn DepotChiffres>, limites: Limites) -> Result<Self> {
        let caches = Constante::TOUTES
            .into_iter()
            .map(|c| CacheChiffres::ouvrir(c, Arc::clone(&depot), limites))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { caches })
    }

    pub fn de(&self, constante: Constante) -> &CacheChiffres {
        &self.caches[constante.indice()]
    }
}
