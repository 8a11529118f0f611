use log::error;

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = match genproxy::config::ProxyConfig::from_env()
    {   Ok(config) => config
      , Err(e) => {
          error!("Startup failed: {}", e);
          std::process::exit(1);
        }
    };

    if let Err(e) = genproxy::server::serve(config).await
    {   error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
