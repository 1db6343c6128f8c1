// src/app/vue.rs
//
// Rendu texte des résultats
// -------------------------
// Le noyau ne connaît que des suites plates de chiffres ; ici on place la
// virgule (un point, en pratique) et on met en forme les listes.

use crate::noyau::Livraison;

/// Insère le point décimal quand la tranche commence au chiffre entier.
///
/// "3141592653" (début 0) -> "3.141592653" ; une tranche du milieu reste telle quelle.
pub fn avec_virgule(debut: u64, chiffres: &str) -> String {
    if debut != 0 || chiffres.len() < 2 {
        return chiffres.to_string();
    }
    let (entier, reste) = chiffres.split_at(1);
    format!("{entier}.{reste}")
}

pub fn livraison(l: &Livraison) -> String {
    avec_virgule(l.debut, &l.chiffres)
}

/// Une ligne par constante : `pi      3.…`.
pub fn liste_constantes(constantes: &[(&str, char)]) -> String {
    let largeur = constantes.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    constantes
        .iter()
        .map(|(nom, chiffre)| format!("{nom:<largeur$}  {chiffre}.…"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Résumé d’un cache : longueur + aperçu des premiers chiffres.
pub fn resume_cache(nom: &str, suite: &str, apercu: usize) -> String {
    if suite.is_empty() {
        return format!("{nom} : cache vide");
    }
    let n = suite.len();
    let tete = avec_virgule(0, &suite[..apercu.min(n)]);
    let points = if apercu < n { "…" } else { "" };
    format!("{nom} : {n} chiffres en cache ({tete}{points})")
}
