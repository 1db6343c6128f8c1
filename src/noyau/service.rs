// src/noyau/service.rs
//
// Service d’accès aux chiffres
// ----------------------------
// Aucune donnée propre : délègue aux caches (partagés) et aux curseurs (par sujet).
// Les noms de constantes et les nombres arrivent tels quels de la couche de
// requêtes : validation locale d’abord (constante, puis signes), calcul ensuite.
//
// Toujours une suite plate de chiffres (indice 0 = chiffre entier) ; placer la
// virgule est le travail de l’affichage.

use std::path::Path;
use std::sync::Arc;

use super::cache::{CacheChiffres, Caches, Limites};
use super::constante::Constante;
use super::curseurs::Curseurs;
use super::erreur::{non_negatif, Result};
use super::stockage::{DepotChiffres, DepotCurseurs, Memoire, Sqlite};

pub struct ServiceChiffres {
    caches: Caches,
    curseurs: Curseurs,
}

/// Ce qu’un sujet a reçu : `chiffres` commence à l’indice `debut` de la suite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Livraison {
    pub debut: u64,
    pub chiffres: String,
}

impl ServiceChiffres {
    pub fn new(
        chiffres: Arc<dyn DepotChiffres>,
        curseurs: Arc<dyn DepotCurseurs>,
        limites: Limites,
    ) -> Result<Self> {
        Ok(Self {
            caches: Caches::ouvrir(chiffres, limites)?,
            curseurs: Curseurs::new(curseurs),
        })
    }

    /// Tout en mémoire : rien ne survit au processus.
    pub fn en_memoire(limites: Limites) -> Result<Self> {
        let depot = Arc::new(Memoire::new());
        Self::new(depot.clone(), depot, limites)
    }

    /// Caches et curseurs dans la même base SQLite.
    pub fn sqlite(chemin: &Path, limites: Limites) -> Result<Self> {
        let depot = Arc::new(Sqlite::ouvrir(chemin)?);
        Self::new(depot.clone(), depot, limites)
    }

    /// (nom, chiffre entier) de chaque constante servie.
    pub fn constantes() -> Vec<(&'static str, char)> {
        Constante::TOUTES
            .iter()
            .map(|c| (c.nom(), c.premier_chiffre()))
            .collect()
    }

    pub fn cache(&self, constante: Constante) -> &CacheChiffres {
        self.caches.de(constante)
    }

    /* ------------------------ Lectures sans sujet ------------------------ */

    /// Chiffre d’indice `indice` (0 = chiffre avant la virgule).
    pub fn chiffre_a(&self, constante: &str, indice: i64) -> Result<char> {
        let c: Constante = constante.parse()?;
        let indice = non_negatif(indice, "indice")?;
        self.caches.de(c).get(indice)
    }

    /// Exactement `nombre` chiffres à partir de `debut`.
    pub fn chiffres_dans(&self, constante: &str, debut: i64, nombre: i64) -> Result<String> {
        let c: Constante = constante.parse()?;
        let debut = non_negatif(debut, "début")?;
        let nombre = non_negatif(nombre, "quantité")?;
        self.caches.de(c).get_range(debut, nombre)
    }

    /// Toute la suite déjà calculée (vide si rien n’est en cache).
    pub fn chiffres_en_cache(&self, constante: &str) -> Result<String> {
        let c: Constante = constante.parse()?;
        Ok(self.caches.de(c).suite())
    }

    /* ------------------------ Lectures par sujet ------------------------ */

    /// Les `nombre` chiffres suivants du sujet, puis son curseur avance d’autant.
    ///
    /// Le cache est étendu AVANT l’avance : un stockage en panne échoue sans
    /// consommer de position. L’avance elle-même est atomique et vérifie la borne
    /// indice_max, donc deux appels concurrents du même sujet reçoivent des plages
    /// disjointes et contiguës, et aucun ne pousse le curseur hors d’atteinte.
    pub fn suivants_pour_sujet(
        &self,
        sujet: &str,
        constante: &str,
        nombre: i64,
    ) -> Result<String> {
        self.lire_suivants(sujet, constante, nombre)
            .map(|livraison| livraison.chiffres)
    }

    /// Comme `suivants_pour_sujet`, avec l’indice de départ de la livraison.
    pub fn lire_suivants(&self, sujet: &str, constante: &str, nombre: i64) -> Result<Livraison> {
        let c: Constante = constante.parse()?;
        let quantite = non_negatif(nombre, "quantité")?;
        let cache = self.caches.de(c);

        let indicatif = self.curseurs.position(sujet, c)?;
        cache.couvrir(indicatif, quantite)?;

        let debut = self.curseurs.avancer(sujet, c, nombre, cache.fin_max())?;
        let chiffres = cache.get_range(debut, quantite).inspect_err(|e| {
            tracing::warn!(
                sujet,
                constante = %c,
                debut,
                quantite,
                erreur = %e,
                "position consommée sans livraison"
            );
        })?;
        Ok(Livraison { debut, chiffres })
    }

    /// Remet le curseur du sujet à 0 ; le cache partagé n’est pas touché.
    pub fn reinitialiser_sujet(&self, sujet: &str, constante: &str) -> Result<()> {
        let c: Constante = constante.parse()?;
        self.curseurs.reinitialiser(sujet, c)
    }

    /// Place le curseur du sujet sur `position`.
    pub fn fixer_position(&self, sujet: &str, constante: &str, position: i64) -> Result<()> {
        let c: Constante = constante.parse()?;
        self.curseurs.fixer(sujet, c, position)
    }

    pub fn position_sujet(&self, sujet: &str, constante: &str) -> Result<u64> {
        let c: Constante = constante.parse()?;
        self.curseurs.position(sujet, c)
    }

    /* ------------------------ Administration ------------------------ */

    /// Supprime tous les curseurs du sujet (à appeler avec la suppression du sujet).
    pub fn supprimer_sujet(&self, sujet: &str) -> Result<usize> {
        self.curseurs.supprimer_sujet(sujet)
    }

    pub fn reinitialiser_tous_les_curseurs(&self) -> Result<()> {
        self.curseurs.tout_reinitialiser()
    }

    /// Vide le cache d’une constante (les curseurs sont conservés).
    pub fn vider_cache(&self, constante: &str) -> Result<()> {
        let c: Constante = constante.parse()?;
        self.caches.de(c).vider()
    }
}
