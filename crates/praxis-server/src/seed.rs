use crate::opt::Seed;
use anyhow::Result;
use praxis_db::sea_orm::Database;
use praxis_entity::user::Role;
use uuid::Uuid;

/// Catalog entries provisioned by `praxis seed`; teachers pick offerings
/// from this list.
const DEFAULT_CATALOG: &[(&str, &str)] = &[
    ("CS101", "Programming I"),
    ("CS102", "Programming II"),
    ("CS103", "Logic Design"),
    ("CS201", "Data Structures"),
    ("CS202", "Operating Systems"),
    ("CS203", "Computer Networks"),
    ("CS301", "Databases"),
    ("CS302", "Software Engineering"),
    ("CS303", "Distributed Systems"),
    ("CS304", "Artificial Intelligence"),
    ("MA101", "Discrete Mathematics"),
    ("MA201", "Probability and Statistics"),
];

pub(crate) async fn run(opt: Seed) -> Result<()> {
    crate::setup_tracing();

    let db = Database::connect(opt.database_url.as_str()).await?;
    praxis_db::migration::migrate(&db).await?;

    for (code, title) in DEFAULT_CATALOG {
        praxis_db::course::Mutation::get_or_create(&db, code, title).await?;
    }
    tracing::info!(courses = DEFAULT_CATALOG.len(), "course catalog seeded");

    if opt.demo {
        for (username, role) in [("teacher", Role::Teacher), ("student", Role::Student)] {
            let user = praxis_db::user::Mutation::create_or_update_from_claims(
                &db,
                &format!("demo-{username}"),
                username,
                None,
                role,
            )
            .await?;
            let token = Uuid::new_v4().simple().to_string();
            praxis_db::access_token::Mutation::issue(&db, user.id, &token).await?;
            tracing::info!(username, token = %token, "demo account ready");
        }
    }

    Ok(())
}
