//! Tests de concurrence : plusieurs fils sur les mêmes caches et curseurs.
//!
//! - avances concurrentes d’un même curseur : positions toutes distinctes, sans trou
//! - extensions concurrentes d’un même cache : une seule écriture par plage
//! - sujets différents : aucune interférence
//! - borne indice_max atteinte à plusieurs : aucune position consommée sans chiffres

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use super::cache::{CacheChiffres, Limites};
use super::constante::Constante;
use super::erreur::{ErreurNoyau, Result};
use super::fournisseur::developpe;
use super::service::ServiceChiffres;
use super::stockage::{DepotChiffres, DepotCurseurs, Memoire, Sqlite, POSITION_MAX};

const FILS: usize = 8;
const TOURS: usize = 25;

fn avances_concurrentes(depot: &dyn DepotCurseurs) {
    let departs: Vec<u64> = thread::scope(|s| {
        let fils: Vec<_> = (0..FILS)
            .map(|_| {
                s.spawn(|| {
                    (0..TOURS)
                        .map(|_| depot.avancer("sujet", Constante::Pi, 3, POSITION_MAX).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        fils.into_iter().flat_map(|f| f.join().unwrap()).collect()
    });

    let distincts: BTreeSet<u64> = departs.iter().copied().collect();
    assert_eq!(distincts.len(), FILS * TOURS, "position livrée deux fois");

    let attendus: BTreeSet<u64> = (0..(FILS * TOURS) as u64).map(|k| k * 3).collect();
    assert_eq!(distincts, attendus, "position sautée");
    assert_eq!(
        depot.position("sujet", Constante::Pi).unwrap(),
        (FILS * TOURS * 3) as u64
    );
}

#[test]
fn conc_avances_memoire() {
    avances_concurrentes(&Memoire::new());
}

#[test]
fn conc_avances_sqlite() {
    avances_concurrentes(&Sqlite::en_memoire().unwrap());
}

/// Dépôt qui compte les écritures.
struct Compteur {
    interne: Memoire,
    ecritures: AtomicUsize,
    chiffres_ecrits: AtomicUsize,
}

impl DepotChiffres for Compteur {
    fn charger(&self, constante: Constante) -> Result<String> {
        self.interne.charger(constante)
    }

    fn ajouter(&self, constante: Constante, debut: u64, chiffres: &str) -> Result<()> {
        self.ecritures.fetch_add(1, Ordering::SeqCst);
        self.chiffres_ecrits.fetch_add(chiffres.len(), Ordering::SeqCst);
        self.interne.ajouter(constante, debut, chiffres)
    }

    fn vider(&self, constante: Constante) -> Result<()> {
        self.interne.vider(constante)
    }
}

#[test]
fn conc_extensions_serialisees() {
    let depot = Arc::new(Compteur {
        interne: Memoire::new(),
        ecritures: AtomicUsize::new(0),
        chiffres_ecrits: AtomicUsize::new(0),
    });
    let cache = CacheChiffres::ouvrir(
        Constante::E,
        depot.clone(),
        Limites {
            indice_max: 2_000,
            pas_extension: 1,
        },
    )
    .unwrap();

    let reference = format!("2{}", developpe(Constante::E, 1_200).unwrap());

    thread::scope(|s| {
        for f in 0..FILS {
            let cache = &cache;
            let reference = &reference;
            s.spawn(move || {
                for k in 0..10u64 {
                    let fin = 100 + (f as u64 * 37 + k * 101) % 1_100;
                    let lu = cache.get_range(0, fin + 1).unwrap();
                    assert_eq!(lu, reference[..=fin as usize]);
                }
            });
        }
    });

    // chaque chiffre écrit une seule fois, quel que soit l’entrelacement
    let h = cache.haut_niveau().unwrap() as usize;
    assert_eq!(depot.chiffres_ecrits.load(Ordering::SeqCst), h + 1);
    assert!(depot.ecritures.load(Ordering::SeqCst) <= FILS * 10);
    assert_eq!(depot.charger(Constante::E).unwrap(), reference[..=h]);
}

#[test]
fn conc_sujets_independants() {
    let service = ServiceChiffres::en_memoire(Limites::default()).unwrap();
    let reference = format!("1{}", developpe(Constante::Sqrt2, 400).unwrap());

    thread::scope(|s| {
        for f in 0..FILS {
            let service = &service;
            let reference = &reference;
            s.spawn(move || {
                let sujet = format!("sujet-{f}");
                let mut lu = String::new();
                for _ in 0..10 {
                    lu.push_str(&service.suivants_pour_sujet(&sujet, "sqrt2", 4).unwrap());
                }
                assert_eq!(lu, reference[..40]);
            });
        }
    });
}

#[test]
fn conc_meme_sujet_sans_doublon() {
    let service = ServiceChiffres::en_memoire(Limites::default()).unwrap();
    let reference = format!("3{}", developpe(Constante::Pi, 1_000).unwrap());

    let livraisons: Vec<String> = thread::scope(|s| {
        let fils: Vec<_> = (0..FILS)
            .map(|_| {
                s.spawn(|| {
                    (0..TOURS)
                        .map(|_| service.suivants_pour_sujet("partage", "pi", 5).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        fils.into_iter().flat_map(|f| f.join().unwrap()).collect()
    });

    let total = FILS * TOURS * 5;
    assert_eq!(service.position_sujet("partage", "pi").unwrap(), total as u64);

    // chaque livraison est une fenêtre alignée du flux ; à eux tous, le flux entier
    let mut fenetres: Vec<&str> = (0..FILS * TOURS)
        .map(|k| &reference[k * 5..k * 5 + 5])
        .collect();
    let mut recues: Vec<&str> = livraisons.iter().map(String::as_str).collect();
    fenetres.sort_unstable();
    recues.sort_unstable();
    assert_eq!(recues, fenetres);
}

#[test]
fn conc_borne_sans_position_perdue() {
    let service = ServiceChiffres::en_memoire(Limites {
        indice_max: 99,
        pas_extension: 100,
    })
    .unwrap();

    // 8 × 5 × 7 = 280 chiffres demandés, 100 disponibles
    let resultats: Vec<Result<String>> = thread::scope(|s| {
        let fils: Vec<_> = (0..FILS)
            .map(|_| {
                s.spawn(|| {
                    (0..5)
                        .map(|_| service.suivants_pour_sujet("partage", "pi", 7))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        fils.into_iter().flat_map(|f| f.join().unwrap()).collect()
    });

    let mut livres = 0;
    for r in resultats {
        match r {
            Ok(chiffres) => {
                assert_eq!(chiffres.len(), 7);
                livres += 7;
            }
            Err(e) => assert!(matches!(e, ErreurNoyau::ArgumentInvalide(_)), "{e}"),
        }
    }

    assert!(livres <= 100);
    assert_eq!(
        service.position_sujet("partage", "pi").unwrap(),
        livres as u64,
        "position avancée sans livraison"
    );
}
