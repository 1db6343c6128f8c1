// src/noyau/stockage/sqlite.rs
//
// Stockage SQLite
// ---------------
// Tables :
// - segments(constante, debut, chiffres) : une ligne par extension, clé (constante, debut)
// - haut_niveau(constante, longueur)     : nombre de chiffres durablement écrits
// - curseurs(sujet, constante, position)
//
// Un segment et le nouveau haut niveau sont écrits dans la même transaction :
// un arrêt brutal ne peut pas laisser le haut niveau devant les chiffres.
// Les écritures prennent le verrou d’écriture dès le BEGIN (IMMEDIATE), ce qui
// garde l’avance de curseur atomique même entre plusieurs processus.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{position_suivante, verifie_position, DepotChiffres, DepotCurseurs};
use crate::noyau::constante::Constante;
use crate::noyau::erreur::{ErreurNoyau, Result};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS segments (
        constante TEXT NOT NULL,
        debut INTEGER NOT NULL,
        chiffres TEXT NOT NULL,
        PRIMARY KEY (constante, debut)
    );

    CREATE TABLE IF NOT EXISTS haut_niveau (
        constante TEXT PRIMARY KEY,
        longueur INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS curseurs (
        sujet TEXT NOT NULL,
        constante TEXT NOT NULL,
        position INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (sujet, constante)
    );
"#;

pub struct Sqlite {
    conn: Mutex<Connection>,
}

fn en_sql(v: u64) -> Result<i64> {
    i64::try_from(v).map_err(|_| ErreurNoyau::ArgumentInvalide(format!("valeur {v} hors SQL")))
}

fn depuis_sql(v: i64) -> Result<u64> {
    u64::try_from(v)
        .map_err(|_| ErreurNoyau::StockageIndisponible(format!("valeur stockée négative ({v})")))
}

impl Sqlite {
    /// Ouvre (ou crée) la base au chemin donné.
    pub fn ouvrir(chemin: &Path) -> Result<Self> {
        if let Some(parent) = chemin.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ErreurNoyau::StockageIndisponible(format!("{} : {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(chemin)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let s = Self::initialiser(conn)?;
        tracing::info!(chemin = %chemin.display(), "base SQLite ouverte");
        Ok(s)
    }

    /// Base SQLite privée en mémoire.
    pub fn en_memoire() -> Result<Self> {
        Self::initialiser(Connection::open_in_memory()?)
    }

    fn initialiser(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn verrou(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn longueur_stockee(conn: &Connection, constante: Constante) -> Result<u64> {
    let longueur: Option<i64> = conn
        .query_row(
            "SELECT longueur FROM haut_niveau WHERE constante = ?1",
            params![constante.nom()],
            |row| row.get(0),
        )
        .optional()?;
    depuis_sql(longueur.unwrap_or(0))
}

fn position_stockee(conn: &Connection, sujet: &str, constante: Constante) -> Result<u64> {
    let position: Option<i64> = conn
        .query_row(
            "SELECT position FROM curseurs WHERE sujet = ?1 AND constante = ?2",
            params![sujet, constante.nom()],
            |row| row.get(0),
        )
        .optional()?;
    depuis_sql(position.unwrap_or(0))
}

fn ecrire_position(conn: &Connection, sujet: &str, constante: Constante, position: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO curseurs (sujet, constante, position) VALUES (?1, ?2, ?3)
         ON CONFLICT (sujet, constante) DO UPDATE SET position = excluded.position",
        params![sujet, constante.nom(), en_sql(position)?],
    )?;
    Ok(())
}

impl DepotChiffres for Sqlite {
    fn charger(&self, constante: Constante) -> Result<String> {
        let conn = self.verrou();
        let longueur = longueur_stockee(&conn, constante)?;

        let mut stmt = conn.prepare(
            "SELECT debut, chiffres FROM segments
             WHERE constante = ?1 AND debut < ?2
             ORDER BY debut",
        )?;
        let mut rows = stmt.query(params![constante.nom(), en_sql(longueur)?])?;

        let mut suite = String::new();
        while let Some(row) = rows.next()? {
            let debut = depuis_sql(row.get(0)?)?;
            let chiffres: String = row.get(1)?;

            if debut != suite.len() as u64 {
                return Err(ErreurNoyau::StockageIndisponible(format!(
                    "trou dans les segments de {constante} : attendu {}, trouvé {debut}",
                    suite.len()
                )));
            }
            suite.push_str(&chiffres);
        }

        if (suite.len() as u64) < longueur {
            return Err(ErreurNoyau::StockageIndisponible(format!(
                "segments de {constante} plus courts que le haut niveau ({} < {longueur})",
                suite.len()
            )));
        }
        suite.truncate(longueur as usize);

        tracing::debug!(constante = %constante, longueur, "suite chargée");
        Ok(suite)
    }

    fn ajouter(&self, constante: Constante, debut: u64, chiffres: &str) -> Result<()> {
        let mut conn = self.verrou();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let longueur = longueur_stockee(&tx, constante)?;
        if longueur != debut {
            return Err(ErreurNoyau::StockageIndisponible(format!(
                "écriture non contiguë pour {constante} : longueur {longueur}, début {debut}"
            )));
        }

        let fin = debut + chiffres.len() as u64;
        tx.execute(
            "INSERT INTO segments (constante, debut, chiffres) VALUES (?1, ?2, ?3)",
            params![constante.nom(), en_sql(debut)?, chiffres],
        )?;
        tx.execute(
            "INSERT INTO haut_niveau (constante, longueur) VALUES (?1, ?2)
             ON CONFLICT (constante) DO UPDATE SET longueur = excluded.longueur",
            params![constante.nom(), en_sql(fin)?],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn vider(&self, constante: Constante) -> Result<()> {
        let mut conn = self.verrou();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM haut_niveau WHERE constante = ?1",
            params![constante.nom()],
        )?;
        tx.execute(
            "DELETE FROM segments WHERE constante = ?1",
            params![constante.nom()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

impl DepotCurseurs for Sqlite {
    fn position(&self, sujet: &str, constante: Constante) -> Result<u64> {
        position_stockee(&self.verrou(), sujet, constante)
    }

    fn avancer(
        &self,
        sujet: &str,
        constante: Constante,
        quantite: u64,
        fin_max: u64,
    ) -> Result<u64> {
        let mut conn = self.verrou();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let avant = position_stockee(&tx, sujet, constante)?;
        let apres = position_suivante(avant, quantite, fin_max)?;
        ecrire_position(&tx, sujet, constante, apres)?;

        tx.commit()?;
        Ok(avant)
    }

    fn fixer(&self, sujet: &str, constante: Constante, position: u64) -> Result<()> {
        let position = verifie_position(position)?;
        ecrire_position(&self.verrou(), sujet, constante, position)
    }

    fn supprimer_sujet(&self, sujet: &str) -> Result<usize> {
        let n = self
            .verrou()
            .execute("DELETE FROM curseurs WHERE sujet = ?1", params![sujet])?;
        Ok(n)
    }

    fn tout_remettre_a_zero(&self) -> Result<()> {
        self.verrou().execute("UPDATE curseurs SET position = 0", [])?;
        Ok(())
    }
}
