use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use std::time::Duration;

use crate::{
    config::Config,
    errors::AppResult,
    models::domain::{QuizDocument, QuizResult},
};

/// Handle on the quiz database and its two collections.
#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
    quizzes_collection: String,
    results_collection: String,
}

impl Database {
    /// Stable API v1, a small pool and short timeouts, so a missing database
    /// turns into a failed load instead of a hanging request.
    pub async fn client_options(config: &Config) -> AppResult<ClientOptions> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;

        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.max_pool_size = Some(10);
        options.min_pool_size = Some(2);
        options.connect_timeout = Some(Duration::from_secs(5));
        options.server_selection_timeout = Some(Duration::from_secs(5));

        Ok(options)
    }

    pub async fn connect(config: &Config) -> AppResult<Self> {
        let client = Client::with_options(Self::client_options(config).await?)?;
        let database = Self {
            client,
            db_name: config.mongo_db_name.clone(),
            quizzes_collection: config.quizzes_collection.clone(),
            results_collection: config.results_collection.clone(),
        };

        database.ping().await?;
        log::info!(
            "Connected to MongoDB database '{}' (quizzes: '{}', results: '{}')",
            database.db_name,
            database.quizzes_collection,
            database.results_collection
        );

        Ok(database)
    }

    pub fn quizzes(&self) -> Collection<QuizDocument> {
        self.client
            .database(&self.db_name)
            .collection(&self.quizzes_collection)
    }

    pub fn results(&self) -> Collection<QuizResult> {
        self.client
            .database(&self.db_name)
            .collection(&self.results_collection)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.ping().await
    }

    async fn ping(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
