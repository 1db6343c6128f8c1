//! Tests scientifiques (campagne) : propriétés du développement et du service.
//!
//! But : vérifier les invariants qui ne dépendent pas d’un exemple précis.
//! - déterminisme + stabilité des préfixes (garde de troncature)
//! - livraison exactement-une-fois par sujet
//! - remise à zéro idempotente
//! - budget temps global (digits bornés)

use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::cache::Limites;
use super::constante::Constante;
use super::fournisseur::developpe;
use super::service::ServiceChiffres;

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn service() -> ServiceChiffres {
    ServiceChiffres::en_memoire(Limites {
        indice_max: 5_000,
        pas_extension: 64,
    })
    .unwrap()
}

/* ------------------------ Fournisseur ------------------------ */

#[test]
fn sci_prefixes_croissants() {
    let start = Instant::now();
    for c in Constante::TOUTES {
        let reference = developpe(c, 400).unwrap();
        for n in (0..400).step_by(37) {
            let court = developpe(c, n).unwrap();
            assert!(reference.starts_with(&court), "{c} n={n}");
            budget(start, Duration::from_secs(30));
        }
    }
}

#[test]
fn sci_garde_de_deux_chiffres_nommee() {
    assert_eq!(super::fournisseur::CHIFFRES_DE_GARDE, 2);
}

#[test]
fn sci_mille_chiffres_de_pi() {
    // chiffres fractionnaires 990..=1009
    let pi = developpe(Constante::Pi, 1010).unwrap();
    assert_eq!(&pi[989..1009], "92164201989380952572");
}

#[test]
fn sci_pi_vingt_mille_chiffres_dans_le_budget() {
    // coût quasi quadratique : la série de Machin ne divise que par des petits entiers
    let start = Instant::now();
    let pi = developpe(Constante::Pi, 20_000).unwrap();
    budget(start, Duration::from_secs(10));

    assert_eq!(pi.len(), 20_000);
    assert!(pi.starts_with("14159265358979323846"));
    assert_eq!(&pi[19_990..], "0490755178");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_prefixe_stable(c in 0usize..3, m in 0i64..250, extra in 0i64..250) {
        let c = Constante::TOUTES[c];
        let court = developpe(c, m).unwrap();
        let long = developpe(c, m + extra).unwrap();
        prop_assert!(long.starts_with(&court));
    }

    /// Deux lectures de suite = la plage de 2n chiffres à partir de la position initiale.
    #[test]
    fn prop_exactement_une_fois(depart in 0i64..500, n in 0i64..60) {
        let s = service();
        s.fixer_position("sujet", "pi", depart).unwrap();

        let premier = s.suivants_pour_sujet("sujet", "pi", n).unwrap();
        let second = s.suivants_pour_sujet("sujet", "pi", n).unwrap();

        prop_assert_eq!(premier + &second, s.chiffres_dans("pi", depart, 2 * n).unwrap());
    }

    #[test]
    fn prop_remise_a_zero_idempotente(
        lectures in prop::collection::vec(0i64..40, 0..6),
        n in 0i64..40,
    ) {
        let s = service();
        for q in lectures {
            s.suivants_pour_sujet("sujet", "e", q).unwrap();
        }

        s.reinitialiser_sujet("sujet", "e").unwrap();
        prop_assert_eq!(
            s.suivants_pour_sujet("sujet", "e", n).unwrap(),
            s.chiffres_dans("e", 0, n).unwrap()
        );
    }
}

/* ------------------------ Scénarios de référence ------------------------ */

#[test]
fn sci_scenarios_de_reference() {
    let s = service();

    assert_eq!(s.chiffre_a("pi", 0).unwrap(), '3');
    assert_eq!(s.chiffre_a("pi", 4).unwrap(), '5');
    assert_eq!(s.chiffres_dans("pi", 0, 12).unwrap(), "314159265358");
    assert_eq!(s.chiffres_dans("e", 0, 12).unwrap(), "271828182845");

    assert_eq!(s.suivants_pour_sujet("s", "pi", 10).unwrap(), "3141592653");
    assert_eq!(s.suivants_pour_sujet("s", "pi", 10).unwrap(), "5897932384");
    s.reinitialiser_sujet("s", "pi").unwrap();
    assert_eq!(s.suivants_pour_sujet("s", "pi", 10).unwrap(), "3141592653");
}

#[test]
fn sci_vingt_premiers_chiffres() {
    let s = service();
    for (nom, attendu) in [
        ("pi", "31415926535897932384"),
        ("e", "27182818284590452353"),
        ("sqrt2", "14142135623730950488"),
    ] {
        assert_eq!(s.chiffres_dans(nom, 0, 20).unwrap(), attendu, "{nom}");
        for (i, ch) in attendu.chars().enumerate() {
            assert_eq!(s.chiffre_a(nom, i as i64).unwrap(), ch, "{nom}[{i}]");
        }
    }
}

#[test]
fn sci_lecture_aleatoire_apres_extension_incrementale() {
    // Le cache grandit par petits bouts ; une lecture au hasard doit rester juste.
    let s = service();
    let reference = format!("3{}", developpe(Constante::Pi, 900).unwrap());

    for fin in (10..=900).step_by(89) {
        s.chiffres_dans("pi", 0, fin).unwrap();
    }
    for i in [1usize, 63, 64, 65, 127, 500, 762, 767, 768, 900] {
        let ch = s.chiffre_a("pi", i as i64).unwrap();
        assert_eq!(Some(ch), reference.chars().nth(i), "indice {i}");
    }
}
