use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::error::Error;
use std::path::PathBuf;

use screening_bot::auth::password::hash_password;
use screening_bot::configuration::get_configuration;
use screening_bot::db;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import FAQ content (categories and questions with answers)
    Import { path: PathBuf },
    /// Export FAQ content
    Export { path: PathBuf },
    /// Provision a staff account with a hashed password
    AddUser {
        #[clap(long)]
        name: String,
        #[clap(long)]
        surname: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long, default_value = "staff")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();
    let settings = get_configuration()?;
    let pool = db::establish_connection(&settings.database.path).await?;
    db::run_migrations(&pool).await?;
    match cli.command {
        Commands::Export { path } => export_data(&pool, path).await?,
        Commands::Import { path } => import_data(&pool, path).await?,
        Commands::AddUser {
            name,
            surname,
            email,
            password,
            role,
        } => add_user(&pool, name, surname, email, password, role).await?,
    }
    Ok(())
}

fn write_to(path: PathBuf, data: Vec<impl Serialize>) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: PathBuf) -> Result<Vec<T>, Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

async fn export_data(pool: &SqlitePool, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let categories = db::queries::categories::get_all_categories(pool).await?;
    let questions = db::queries::questions::get_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(&path)?
    }
    write_to(path.clone().join("categories.csv"), categories)?;
    write_to(path.join("questions.csv"), questions)?;
    Ok(())
}

async fn import_data(pool: &SqlitePool, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let categories: Vec<db::Category> = read_from(path.clone().join("categories.csv"))?;
    let questions: Vec<db::Question> = read_from(path.join("questions.csv"))?;
    db::queries::categories::import_categories(pool, categories).await?;
    db::queries::questions::import_questions(pool, questions).await?;
    Ok(())
}

async fn add_user(
    pool: &SqlitePool,
    name: String,
    surname: String,
    email: String,
    password: String,
    role: String,
) -> Result<(), Box<dyn Error>> {
    let password_hash = hash_password(&password)?;
    let id =
        db::queries::users::create_user(pool, &name, &surname, &email, &password_hash, &role)
            .await?;
    println!("Created {role} account {email} (id {id})");
    Ok(())
}
