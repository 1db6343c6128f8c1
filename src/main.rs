// src/main.rs
//
// Chiffres irrationnels : point d’entrée ligne de commande
// --------------------------------------------------------
// Ordre : arguments, configuration, journal (stderr), service, commande.
// La sortie standard ne reçoit que le résultat ; tout le reste va au journal.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chiffres_irrationnels::app::{code_sortie, executer, Cli, Config};
use chiffres_irrationnels::ErreurNoyau;

fn installer_journal(filtre: &str) {
    let filtre = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filtre));
    tracing_subscriber::fmt()
        .with_env_filter(filtre)
        .with_writer(std::io::stderr)
        .init();
}

fn lancer(cli: &Cli) -> anyhow::Result<String> {
    let config = Config::charger(cli.config.as_deref()).context("chargement de la configuration")?;
    installer_journal(&config.journal);

    let service = config
        .ouvrir_service()
        .context("ouverture du dépôt de chiffres")?;
    Ok(executer(&service, &cli.commande)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match lancer(&cli) {
        Ok(sortie) => {
            println!("{sortie}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("erreur : {e:#}");
            let code = e.downcast_ref::<ErreurNoyau>().map_or(1, code_sortie);
            ExitCode::from(code)
        }
    }
}
