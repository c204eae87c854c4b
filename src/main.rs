use pocketbook::app::App;
use pocketbook::domain_model::*;
use pocketbook::logger::*;
use pocketbook::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let app = App::try_new(&project_settings)?;

    match cli.command.unwrap_or(Command::Me) {
        Command::Login { username, password } => {
            let user = app
                .auth_service
                .login(LoginInput { username, password })
                .await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Me => match app.auth_service.restore().await {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => anyhow::bail!("not signed in"),
        },
        Command::Request { method, path, data } => {
            let mut request = OutboundRequest::new(method, path);
            if let Some(data) = data {
                request.body = Some(serde_json::from_str(&data)?);
            }
            let response = app.client.execute(request).await?;
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
        Command::Logout => {
            app.auth_service.logout();
        }
    }

    Ok(())
}
