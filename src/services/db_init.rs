use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

/// Creates the indexes every upsert invariant relies on. Concurrent writers
/// racing on the same (symbol, date) or (portfolio_id, symbol) are serialized
/// by these unique constraints.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // instruments: unique symbol
    {
        let col = db.collection::<mongodb::bson::Document>("instruments");
        let model = IndexModel::builder()
            .keys(doc! { "symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // quotes: unique per (symbol, date)
    {
        let col = db.collection::<mongodb::bson::Document>("quotes");
        let model = IndexModel::builder()
            .keys(doc! { "symbol": 1, "date": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // portfolios: unique key
    {
        let col = db.collection::<mongodb::bson::Document>("portfolios");
        let model = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // positions: unique per (portfolio_id, symbol)
    {
        let col = db.collection::<mongodb::bson::Document>("positions");
        let model = IndexModel::builder()
            .keys(doc! { "portfolio_id": 1, "symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // alerts: helpful for the monitor scan (active + symbol)
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");
        let model = IndexModel::builder()
            .keys(doc! { "active": 1, "symbol": 1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    // logs: newest-first listing
    {
        let col = db.collection::<mongodb::bson::Document>("logs");
        let model = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
