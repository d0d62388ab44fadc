use sqlx::PgPool;

/// Connect, migrate and confirm the core tables exist.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    capstone_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "teams",
        "team_members",
        "team_requests",
        "mentor_requests",
        "review_requests",
        "scheduled_reviews",
        "weekly_progress_verifications",
        "team_queries",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
