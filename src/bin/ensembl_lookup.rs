use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ensembl_id_lookup::config::ResolverConfig;
use ensembl_id_lookup::domain::BatchInput;
use ensembl_id_lookup::ensembl::{EnsemblHttpClient, SymbolLookup};
use ensembl_id_lookup::error::LookupError;
use ensembl_id_lookup::output::{ConsoleOutput, CsvOutput};
use ensembl_id_lookup::resolver::BatchResolver;

#[derive(Parser)]
#[command(name = "ensembl-lookup")]
#[command(about = "Resolve gene symbols to Ensembl IDs and write ensembl_ids.csv")]
#[command(version)]
struct Cli {
    /// Species name on the first line, one gene symbol per following line
    input: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<LookupError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &LookupError) -> u8 {
    match error {
        LookupError::InputRead { .. } | LookupError::MissingSpecies => 2,
        LookupError::HttpClient(_) | LookupError::OutputWrite { .. } => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ResolverConfig::default();
    resolve_file(&cli.input, &config, EnsemblHttpClient::new)?;
    Ok(())
}

/// Reads the input before building the client, so a bad input path fails
/// without any network activity or output file.
fn resolve_file<L, F>(
    input: &Utf8Path,
    config: &ResolverConfig,
    connect: F,
) -> Result<(), LookupError>
where
    L: SymbolLookup,
    F: FnOnce(&ResolverConfig) -> Result<L, LookupError>,
{
    let input = BatchInput::from_path(input)?;
    let client = connect(config)?;
    let table = BatchResolver::new(client).resolve(&input, &ConsoleOutput);
    CsvOutput::write_file(&config.output_path, &table)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ensembl_id_lookup::domain::{EnsemblId, GeneSymbol, Species};
    use ensembl_id_lookup::error::{FailureCause, LookupFailure};

    use super::*;

    struct UnreachableLookup;

    impl SymbolLookup for UnreachableLookup {
        fn lookup(
            &self,
            _species: &Species,
            symbol: &GeneSymbol,
        ) -> Result<EnsemblId, LookupFailure> {
            Err(LookupFailure::new(
                symbol,
                FailureCause::Transport("connection refused".to_string()),
            ))
        }
    }

    fn config_in(dir: &Utf8Path) -> ResolverConfig {
        ResolverConfig {
            output_path: dir.join("ensembl_ids.csv"),
            ..ResolverConfig::default()
        }
    }

    fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        (temp, path)
    }

    #[test]
    fn input_errors_exit_with_two() {
        let read = LookupError::InputRead {
            path: Utf8PathBuf::from("/nonexistent"),
        };
        assert_eq!(map_exit_code(&read), 2);
        assert_eq!(map_exit_code(&LookupError::MissingSpecies), 2);
    }

    #[test]
    fn other_fatal_errors_exit_with_one() {
        assert_eq!(map_exit_code(&LookupError::HttpClient("tls".to_string())), 1);
        let write = LookupError::OutputWrite {
            path: Utf8PathBuf::from("ensembl_ids.csv"),
            message: "permission denied".to_string(),
        };
        assert_eq!(map_exit_code(&write), 1);
    }

    #[test]
    fn output_defaults_to_working_directory() {
        let config = ResolverConfig::default();
        assert!(config.output_path.is_relative());
        assert_eq!(config.output_path.components().count(), 1);
    }

    #[test]
    fn unreadable_input_stops_before_client_and_output() {
        let (_temp, dir) = utf8_tempdir();
        let config = config_in(&dir);
        let connected = Cell::new(false);

        let err = resolve_file(&dir.join("absent.txt"), &config, |_| {
            connected.set(true);
            Ok(UnreachableLookup)
        })
        .unwrap_err();

        assert!(matches!(err, LookupError::InputRead { .. }));
        assert_eq!(map_exit_code(&err), 2);
        assert!(!connected.get());
        assert!(!config.output_path.exists());
    }

    #[test]
    fn empty_input_is_missing_species() {
        let (_temp, dir) = utf8_tempdir();
        let input = dir.join("genes.txt");
        std::fs::write(&input, "").unwrap();
        let config = config_in(&dir);

        let err = resolve_file(&input, &config, |_| Ok(UnreachableLookup)).unwrap_err();

        assert!(matches!(err, LookupError::MissingSpecies));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn species_only_input_writes_header_only() {
        let (_temp, dir) = utf8_tempdir();
        let input = dir.join("genes.txt");
        std::fs::write(&input, "Mus musculus\n").unwrap();
        let config = config_in(&dir);

        resolve_file(&input, &config, |_| Ok(UnreachableLookup)).unwrap();

        let written = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(written, "Gene Symbol,ENSEMBL ID\n");
    }

    #[test]
    fn failed_lookups_still_write_every_row() {
        let (_temp, dir) = utf8_tempdir();
        let input = dir.join("genes.txt");
        std::fs::write(&input, "Mus musculus\nTrp53\nBrca1\n").unwrap();
        let config = config_in(&dir);

        resolve_file(&input, &config, |_| Ok(UnreachableLookup)).unwrap();

        let written = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(written, "Gene Symbol,ENSEMBL ID\ntrp53,-\nbrca1,-\n");
    }

    #[test]
    fn client_build_failure_is_fatal() {
        let (_temp, dir) = utf8_tempdir();
        let input = dir.join("genes.txt");
        std::fs::write(&input, "Mus musculus\nTrp53\n").unwrap();
        let config = config_in(&dir);

        let err = resolve_file(&input, &config, |_| {
            Err::<UnreachableLookup, _>(LookupError::HttpClient("no TLS backend".to_string()))
        })
        .unwrap_err();

        assert_eq!(map_exit_code(&err), 1);
        assert!(!config.output_path.exists());
    }
}
