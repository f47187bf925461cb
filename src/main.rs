use anyhow::{Context, Result};
use dog_search::{app::App, cli, config::Config, logger, service::DogService};
use log::{info, LevelFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = cli::app().get_matches();
    let options = cli::options(&matches)?;

    let mut config = Config::new();
    config
        .load(options.config_dir.as_deref())
        .context("Failed to load configuration")?;

    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        config.log_level
    };
    logger::init(level)?;

    if options.save_login {
        config
            .save_credentials(options.name.as_deref(), options.email.as_deref())
            .context("Failed to save login")?;
        info!("Saved login to {:?}", config.file_path());
    }

    let service = DogService::new(&config.base_url).context("Failed to create HTTP client")?;
    let app = App::new(config)?;
    let fulfilled = app.run(&service, &options).await?;
    println!("{}", app.render().await);
    app.finish(&service).await?;

    if !fulfilled {
        std::process::exit(1);
    }
    Ok(())
}
