use anyhow::{bail, Result};
use multilingual_site::config;
use multilingual_site::i18n::{
    FsTranslationSource, Language, TranslationMapping, TranslationSource, TranslationValidator,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("check_translations=info".parse()?),
        )
        .init();

    let config = config::Config::from_env()?;
    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.translations_dir.clone());

    info!("Checking translations in {}", dir);
    let source = FsTranslationSource::new(&dir);

    let canonical_language = Language::canonical();
    let canonical = fetch(&source, canonical_language).await?;
    info!(
        "{} ({}): {} keys",
        canonical_language.name(),
        canonical_language.display_code(),
        canonical.len()
    );

    let mut total_errors = 0;
    for language in Language::all().into_iter().filter(|l| !l.is_canonical()) {
        let mapping = match fetch(&source, language).await {
            Ok(mapping) => mapping,
            Err(e) => {
                // A missing file degrades to the default language on the page
                warn!("{}: {}", language.display_code(), e);
                continue;
            }
        };

        let report = TranslationValidator::validate(&canonical, &mapping);
        info!(
            "{} ({}): {} keys, {} errors, {} warnings",
            language.name(),
            language.display_code(),
            mapping.len(),
            report.errors.len(),
            report.warnings.len()
        );
        for problem in &report.errors {
            error!("  [{}] {}", language.display_code(), problem);
        }
        for problem in &report.warnings {
            warn!("  [{}] {}", language.display_code(), problem);
        }
        total_errors += report.errors.len();
    }

    if total_errors > 0 {
        bail!("{} translation errors found", total_errors);
    }

    info!("✓ All translations passed validation");
    Ok(())
}

async fn fetch(source: &FsTranslationSource, language: Language) -> Result<TranslationMapping> {
    Ok(source.fetch(&format!("{}.json", language.code())).await?)
}
