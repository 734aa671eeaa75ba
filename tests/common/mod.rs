use sea_orm::{Database, DatabaseConnection};
use user_directory::{SeaOrmUserRepository, User, UserRepository, schema};

pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    schema::create_tables(&db).await.unwrap();
    db
}

pub async fn setup_repository() -> SeaOrmUserRepository {
    SeaOrmUserRepository::new(setup().await)
}

pub async fn create_user<R: UserRepository>(repository: &R, handle: &str) -> User {
    repository
        .create(
            &format!("User {handle}"),
            &format!("hash-{handle}"),
            handle,
            &format!("{handle}@example.com"),
        )
        .await
        .unwrap()
}
