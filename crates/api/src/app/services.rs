use std::sync::Arc;

use catalog_export_infra::{
    export::{OrderExporter, ProductExporter},
    pagination::CursorPaginator,
    store::{CatalogSnapshot, InMemoryCatalogStore, OrderRepository, ProductRepository},
};
use catalog_export_products::FieldPolicy;

use crate::config::ApiConfig;

/// Exporters shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductExporter,
    pub orders: OrderExporter,
}

impl AppServices {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        paginator: CursorPaginator,
        field_policy: FieldPolicy,
    ) -> Self {
        Self {
            products: ProductExporter::new(products.clone(), paginator).with_field_policy(field_policy),
            orders: OrderExporter::new(orders, products, paginator),
        }
    }

    /// Both exporters over one in-memory store.
    pub fn in_memory(store: Arc<InMemoryCatalogStore>, paginator: CursorPaginator, field_policy: FieldPolicy) -> Self {
        Self::new(store.clone(), store, paginator, field_policy)
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let paginator = CursorPaginator::new(config.page_size);

    if config.use_persistent_stores {
        #[cfg(feature = "postgres")]
        {
            return build_persistent_services(config, paginator).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    build_in_memory_services(config, paginator)
}

fn build_in_memory_services(config: &ApiConfig, paginator: CursorPaginator) -> anyhow::Result<AppServices> {
    let store = match &config.snapshot_path {
        Some(path) => InMemoryCatalogStore::from_snapshot(CatalogSnapshot::load(path)?)?,
        None => {
            tracing::info!("no EXPORT_SNAPSHOT_PATH set; serving an empty in-memory catalog");
            InMemoryCatalogStore::new()
        }
    };

    Ok(AppServices::in_memory(Arc::new(store), paginator, config.field_policy))
}

#[cfg(feature = "postgres")]
async fn build_persistent_services(config: &ApiConfig, paginator: CursorPaginator) -> anyhow::Result<AppServices> {
    use anyhow::Context;
    use catalog_export_infra::store::PostgresCatalogStore;

    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;

    let store = PostgresCatalogStore::connect(url).await?;
    store.ensure_schema().await?;
    if let Some(path) = &config.snapshot_path {
        store.import(&CatalogSnapshot::load(path)?).await?;
    }
    tracing::info!("using postgres catalog store");

    let store = Arc::new(store);
    Ok(AppServices::new(store.clone(), store, paginator, config.field_policy))
}
