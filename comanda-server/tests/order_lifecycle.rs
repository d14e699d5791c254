//! Order lifecycle integration tests against a real (temporary) SQLite
//! database: placement atomicity, stock accounting, the status state
//! machine, table occupancy and the live event feed.

use comanda_server::auth::{Capability, Identity};
use comanda_server::cart;
use comanda_server::db::{self, DbService};
use comanda_server::error::AppError;
use comanda_server::live::{LiveBus, Topic};
use comanda_server::orders::{OrderEngine, PlacementItem, PlacementRequest};
use comanda_server::tenant::TenantScope;
use shared::live::LiveEvent;
use shared::util::now_millis;
use shared::models::dining_table::{DiningTable, DiningTableCreate};
use shared::models::order::{OrderStatus, PaymentStatus, Station};
use shared::models::product::{Product, ProductCreate};
use shared::models::tenant::{Tenant, TenantCreate};

struct Fixture {
    _dir: tempfile::TempDir,
    db: DbService,
    bus: LiveBus,
    engine: OrderEngine,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comanda-test.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    let bus = LiveBus::new(64);
    let engine = OrderEngine::new(db.pool.clone(), bus.clone());
    Fixture {
        _dir: dir,
        db,
        bus,
        engine,
    }
}

async fn seed_tenant(fx: &Fixture, code: &str) -> (Tenant, DiningTable) {
    let tenant = db::tenants::create(
        &fx.db.pool,
        &TenantCreate {
            name: format!("Trattoria {code}"),
            code: code.to_string(),
            tax_rate: Some(0.08),
        },
    )
    .await
    .unwrap();
    let table = db::tables::create(
        &fx.db.pool,
        tenant.id,
        &DiningTableCreate {
            number: "T1".to_string(),
            capacity: Some(4),
        },
    )
    .await
    .unwrap();
    (tenant, table)
}

async fn seed_product(
    fx: &Fixture,
    tenant_id: i64,
    name: &str,
    price: f64,
    station: Station,
    stock: i64,
) -> Product {
    db::products::create(
        &fx.db.pool,
        tenant_id,
        &ProductCreate {
            category: "Mains".to_string(),
            name: name.to_string(),
            price,
            station,
            available_stock: stock,
            promo_price: None,
            promo_starts_at: None,
            promo_ends_at: None,
        },
    )
    .await
    .unwrap()
}

fn customer(tenant_id: i64, table_id: i64, subject: &str) -> Identity {
    Identity {
        subject: subject.to_string(),
        name: format!("Guest {subject}"),
        session_id: format!("sess-{subject}"),
        tenant_id: Some(tenant_id),
        table_id: Some(table_id),
        capabilities: vec![Capability::Customer],
    }
}

fn staff(tenant_id: i64, cap: Capability) -> Identity {
    Identity {
        subject: format!("staff-{cap:?}"),
        name: format!("{cap:?} One"),
        session_id: format!("sess-staff-{cap:?}"),
        tenant_id: Some(tenant_id),
        table_id: None,
        capabilities: vec![cap],
    }
}

fn request(table_id: i64, items: &[(i64, i64)]) -> PlacementRequest {
    PlacementRequest {
        table_id,
        items: items
            .iter()
            .map(|&(product_id, quantity)| PlacementItem {
                product_id,
                quantity,
            })
            .collect(),
        special_instructions: String::new(),
    }
}

async fn table_occupied(fx: &Fixture, table_id: i64) -> bool {
    db::tables::get_scoped(&fx.db.pool, &TenantScope::Unscoped, table_id)
        .await
        .unwrap()
        .unwrap()
        .is_occupied
}

#[tokio::test]
async fn placement_computes_totals_routes_stations_and_occupies_the_table() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "roma").await;
    let burger = seed_product(&fx, tenant.id, "Burger", 5.00, Station::Kitchen, 10).await;
    let cocktail = seed_product(&fx, tenant.id, "Negroni", 7.20, Station::Bar, 10).await;

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::resolve(&guest).unwrap();

    let view = fx
        .engine
        .place_order(
            &guest,
            &scope,
            request(table.id, &[(burger.id, 2), (cocktail.id, 1)]),
        )
        .await
        .unwrap();

    // 2 x 5.00 + 1 x 7.20 = 17.20, +8% tax = 18.576 -> 18.58
    assert_eq!(view.order.status, OrderStatus::Pending);
    assert_eq!(view.order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(view.order.total_amount, 18.58);
    assert!(view.order.order_number.starts_with("ORD-"));

    // Lines snapshot name, price and station at placement
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.lines[0].station, Station::Kitchen);
    assert_eq!(view.lines[1].station, Station::Bar);
    assert_eq!(view.lines[1].unit_price, 7.20);

    // Stock decremented per line, table occupied
    assert_eq!(
        db::products::available_stock(&fx.db.pool, burger.id)
            .await
            .unwrap(),
        8
    );
    assert_eq!(
        db::products::available_stock(&fx.db.pool, cocktail.id)
            .await
            .unwrap(),
        9
    );
    assert!(table_occupied(&fx, table.id).await);
}

#[tokio::test]
async fn insufficient_stock_aborts_the_whole_placement() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "napoli").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;
    let tiramisu = seed_product(&fx, tenant.id, "Tiramisu", 4.50, Station::Kitchen, 1).await;

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::resolve(&guest).unwrap();

    let err = fx
        .engine
        .place_order(
            &guest,
            &scope,
            request(table.id, &[(pasta.id, 2), (tiramisu.id, 2)]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(ref name) if name == "Tiramisu"));

    // The earlier line's decrement was rolled back with the order
    assert_eq!(
        db::products::available_stock(&fx.db.pool, pasta.id)
            .await
            .unwrap(),
        10
    );
    let orders = db::orders::list_scoped(&fx.db.pool, &TenantScope::Tenant(tenant.id), None, None)
        .await
        .unwrap();
    assert!(orders.is_empty());
    assert!(!table_occupied(&fx, table.id).await);
}

#[tokio::test]
async fn stage_skipping_is_rejected() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "milano").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::resolve(&guest).unwrap();
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(pasta.id, 1)]))
        .await
        .unwrap();

    let kitchen = staff(tenant.id, Capability::Kitchen);
    let err = fx
        .engine
        .transition(&kitchen, &scope, view.order.id, OrderStatus::Served, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Served,
        }
    ));

    // The order is untouched by the rejected request
    let order = db::orders::get(&fx.db.pool, view.order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn cancellation_restores_stock_and_sibling_orders_keep_the_table() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "torino").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let g1 = customer(tenant.id, table.id, "g1");
    let g2 = customer(tenant.id, table.id, "g2");
    let scope = TenantScope::Tenant(tenant.id);

    let first = fx
        .engine
        .place_order(&g1, &scope, request(table.id, &[(pasta.id, 2)]))
        .await
        .unwrap();
    let second = fx
        .engine
        .place_order(&g2, &scope, request(table.id, &[(pasta.id, 1)]))
        .await
        .unwrap();
    assert_eq!(
        db::products::available_stock(&fx.db.pool, pasta.id)
            .await
            .unwrap(),
        7
    );

    let owner = staff(tenant.id, Capability::Owner);
    fx.engine
        .cancel(&owner, &scope, first.order.id, "changed their mind".to_string())
        .await
        .unwrap();

    // Stock restored, but the sibling party still holds the table
    assert_eq!(
        db::products::available_stock(&fx.db.pool, pasta.id)
            .await
            .unwrap(),
        9
    );
    assert!(table_occupied(&fx, table.id).await);

    fx.engine
        .cancel(&owner, &scope, second.order.id, "kitchen closing".to_string())
        .await
        .unwrap();
    assert!(!table_occupied(&fx, table.id).await);
}

#[tokio::test]
async fn concurrent_placements_cannot_oversell_the_last_unit() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "verona").await;
    let cake = seed_product(&fx, tenant.id, "Last Cake", 6.00, Station::Kitchen, 1).await;

    let g1 = customer(tenant.id, table.id, "g1");
    let g2 = customer(tenant.id, table.id, "g2");
    let scope = TenantScope::Tenant(tenant.id);

    let (a, b) = tokio::join!(
        fx.engine
            .place_order(&g1, &scope, request(table.id, &[(cake.id, 1)])),
        fx.engine
            .place_order(&g2, &scope, request(table.id, &[(cake.id, 1)])),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one placement may win the last unit");
    let failure = if a.is_err() { a } else { b };
    assert!(matches!(
        failure.unwrap_err(),
        AppError::InsufficientStock(_)
    ));
    assert_eq!(
        db::products::available_stock(&fx.db.pool, cake.id)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn concurrent_placements_with_ample_stock_all_succeed() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "palermo").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 100).await;

    // More simultaneous placements than pool connections: none may
    // stall on a second connection while holding its transaction.
    let guests: Vec<Identity> = (0..6)
        .map(|i| customer(tenant.id, table.id, &format!("g{i}")))
        .collect();
    let scope = TenantScope::Tenant(tenant.id);

    let results = futures::future::join_all(guests.iter().map(|guest| {
        fx.engine
            .place_order(guest, &scope, request(table.id, &[(pasta.id, 1)]))
    }))
    .await;

    let failures: Vec<String> = results
        .iter()
        .filter_map(|r| r.as_ref().err().map(|e| e.to_string()))
        .collect();
    assert!(
        failures.is_empty(),
        "placements failed despite ample stock: {failures:?}"
    );
    assert_eq!(
        db::products::available_stock(&fx.db.pool, pasta.id)
            .await
            .unwrap(),
        94
    );
}

#[tokio::test]
async fn full_walk_keeps_the_table_until_the_bill_is_paid() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "firenze").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(pasta.id, 1)]))
        .await
        .unwrap();

    let kitchen = staff(tenant.id, Capability::Kitchen);
    for next in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ] {
        let moved = fx
            .engine
            .transition(&kitchen, &scope, view.order.id, next, None)
            .await
            .unwrap();
        assert_eq!(moved.order.status, next);
        // Served-but-unpaid still occupies
        assert!(table_occupied(&fx, table.id).await, "occupied through {next}");
    }

    // Confirmation recorded who accepted the order
    let order = db::orders::get(&fx.db.pool, view.order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.confirmed_by.as_deref(), Some("Kitchen One"));

    let cashier = staff(tenant.id, Capability::Cashier);
    fx.engine
        .settle_payment(&cashier, &scope, view.order.id, PaymentStatus::Paid)
        .await
        .unwrap();
    assert!(!table_occupied(&fx, table.id).await);
}

#[tokio::test]
async fn waste_terminal_releases_the_table_without_restoring_stock() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "pisa").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(pasta.id, 3)]))
        .await
        .unwrap();

    let kitchen = staff(tenant.id, Capability::Kitchen);
    for next in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::CustomerRefused,
    ] {
        fx.engine
            .transition(&kitchen, &scope, view.order.id, next, None)
            .await
            .unwrap();
    }

    // The food was produced: the loss stays on the stock ledger
    assert_eq!(
        db::products::available_stock(&fx.db.pool, pasta.id)
            .await
            .unwrap(),
        7
    );
    assert!(!table_occupied(&fx, table.id).await);

    // Terminal: nothing moves out of a waste status
    let err = fx
        .engine
        .transition(&kitchen, &scope, view.order.id, OrderStatus::Served, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
async fn customers_cancel_only_their_own_pending_orders() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "bari").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let g1 = customer(tenant.id, table.id, "g1");
    let g2 = customer(tenant.id, table.id, "g2");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&g1, &scope, request(table.id, &[(pasta.id, 1)]))
        .await
        .unwrap();

    // Someone else's order
    let err = fx
        .engine
        .cancel(&g2, &scope, view.order.id, "not mine".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Own order, but already confirmed
    let kitchen = staff(tenant.id, Capability::Kitchen);
    fx.engine
        .transition(&kitchen, &scope, view.order.id, OrderStatus::Confirmed, None)
        .await
        .unwrap();
    let err = fx
        .engine
        .cancel(&g1, &scope, view.order.id, "too late".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn confirming_requires_a_confirm_capability() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "siena").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(pasta.id, 1)]))
        .await
        .unwrap();

    let care = staff(tenant.id, Capability::CustomerCare);
    let err = fx
        .engine
        .transition(&care, &scope, view.order.id, OrderStatus::Confirmed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // A cancellation without a reason is rejected too
    let owner = staff(tenant.id, Capability::Owner);
    let err = fx
        .engine
        .cancel(&owner, &scope, view.order.id, "  ".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn orders_are_invisible_across_tenants() {
    let fx = fixture().await;
    let (tenant_a, table_a) = seed_tenant(&fx, "alpha").await;
    let (tenant_b, _) = seed_tenant(&fx, "beta").await;
    let pasta = seed_product(&fx, tenant_a.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let guest = customer(tenant_a.id, table_a.id, "g1");
    let scope_a = TenantScope::Tenant(tenant_a.id);
    let view = fx
        .engine
        .place_order(&guest, &scope_a, request(table_a.id, &[(pasta.id, 1)]))
        .await
        .unwrap();

    // Tenant B's staff cannot even learn the order exists
    let scope_b = TenantScope::Tenant(tenant_b.id);
    let hidden = db::orders::get_scoped(&fx.db.pool, &scope_b, view.order.id)
        .await
        .unwrap();
    assert!(hidden.is_none());

    let intruder = staff(tenant_b.id, Capability::Owner);
    let err = fx
        .engine
        .transition(&intruder, &scope_b, view.order.id, OrderStatus::Confirmed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // The unscoped administrator sees it
    let visible = db::orders::get_scoped(&fx.db.pool, &TenantScope::Unscoped, view.order.id)
        .await
        .unwrap();
    assert!(visible.is_some());
}

#[tokio::test]
async fn station_filter_splits_kitchen_and_bar_dashboards() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "genova").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;
    let spritz = seed_product(&fx, tenant.id, "Spritz", 6.00, Station::Bar, 10).await;

    let g1 = customer(tenant.id, table.id, "g1");
    let g2 = customer(tenant.id, table.id, "g2");
    let scope = TenantScope::Tenant(tenant.id);

    let food_only = fx
        .engine
        .place_order(&g1, &scope, request(table.id, &[(pasta.id, 1)]))
        .await
        .unwrap();
    let drinks_only = fx
        .engine
        .place_order(&g2, &scope, request(table.id, &[(spritz.id, 2)]))
        .await
        .unwrap();

    let kitchen_view =
        db::orders::list_scoped(&fx.db.pool, &scope, None, Some(Station::Kitchen))
            .await
            .unwrap();
    assert_eq!(kitchen_view.len(), 1);
    assert_eq!(kitchen_view[0].id, food_only.order.id);

    let bar_view = db::orders::list_scoped(&fx.db.pool, &scope, None, Some(Station::Bar))
        .await
        .unwrap();
    assert_eq!(bar_view.len(), 1);
    assert_eq!(bar_view[0].id, drinks_only.order.id);
}

#[tokio::test]
async fn lifecycle_events_reach_both_topics() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "savona").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let mut restaurant_rx = fx.bus.subscribe(Topic::Restaurant(tenant.id));

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(pasta.id, 2)]))
        .await
        .unwrap();

    let msg = restaurant_rx.recv().await.unwrap();
    match msg.event {
        LiveEvent::NewOrder {
            order_id,
            items_count,
            total_amount,
            ..
        } => {
            assert_eq!(order_id, view.order.id);
            assert_eq!(items_count, 2);
            assert_eq!(total_amount, view.order.total_amount);
        }
        other => panic!("expected new_order, got {other:?}"),
    }

    let mut order_rx = fx.bus.subscribe(Topic::Order(view.order.id));
    let kitchen = staff(tenant.id, Capability::Kitchen);
    fx.engine
        .transition(&kitchen, &scope, view.order.id, OrderStatus::Confirmed, None)
        .await
        .unwrap();

    let msg = order_rx.recv().await.unwrap();
    match msg.event {
        LiveEvent::OrderStatusUpdate {
            status, updated_by, ..
        } => {
            assert_eq!(status, OrderStatus::Confirmed);
            assert_eq!(updated_by, "Kitchen One");
        }
        other => panic!("expected order_status_update, got {other:?}"),
    }

    // And the restaurant feed saw both: the placement and the update
    let second = restaurant_rx.recv().await.unwrap();
    assert!(matches!(
        second.event,
        LiveEvent::OrderStatusUpdate { .. }
    ));
}

#[tokio::test]
async fn cart_mutations_gate_on_available_stock() {
    let fx = fixture().await;
    let (tenant, _) = seed_tenant(&fx, "lucca").await;
    let (other, _) = seed_tenant(&fx, "trento").await;
    let cake = seed_product(&fx, tenant.id, "Cake", 4.00, Station::Kitchen, 3).await;

    let scope = TenantScope::Tenant(tenant.id);

    // The whole remaining stock is fine, one more is not
    cart::check_availability(&fx.db.pool, &scope, cake.id, 3)
        .await
        .unwrap();
    let err = cart::check_availability(&fx.db.pool, &scope, cake.id, 4)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(ref name) if name == "Cake"));

    // Unknown products and other tenants' products read as absent
    let err = cart::check_availability(&fx.db.pool, &scope, 9999, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = cart::check_availability(&fx.db.pool, &TenantScope::Tenant(other.id), cake.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn active_promotion_price_is_snapshotted_at_placement() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "modena").await;
    let now = now_millis();
    let promo = db::products::create(
        &fx.db.pool,
        tenant.id,
        &ProductCreate {
            category: "Mains".to_string(),
            name: "Promo Pizza".to_string(),
            price: 5.00,
            station: Station::Kitchen,
            available_stock: 10,
            promo_price: Some(3.50),
            promo_starts_at: Some(now - 60_000),
            promo_ends_at: Some(now + 60_000),
        },
    )
    .await
    .unwrap();

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(promo.id, 2)]))
        .await
        .unwrap();

    // The discounted price is frozen into the line, not the list price:
    // 2 x 3.50 = 7.00, +8% tax = 7.56
    assert_eq!(view.lines[0].unit_price, 3.50);
    assert_eq!(view.order.total_amount, 7.56);
}

#[tokio::test]
async fn expired_promotion_falls_back_to_the_list_price() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "aosta").await;
    let now = now_millis();
    let stale = db::products::create(
        &fx.db.pool,
        tenant.id,
        &ProductCreate {
            category: "Mains".to_string(),
            name: "Old Promo Pizza".to_string(),
            price: 5.00,
            station: Station::Kitchen,
            available_stock: 10,
            promo_price: Some(3.50),
            promo_starts_at: Some(now - 120_000),
            promo_ends_at: Some(now - 60_000),
        },
    )
    .await
    .unwrap();

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(stale.id, 2)]))
        .await
        .unwrap();

    // 2 x 5.00 = 10.00, +8% tax = 10.80
    assert_eq!(view.lines[0].unit_price, 5.00);
    assert_eq!(view.order.total_amount, 10.80);
}

#[tokio::test]
async fn recalculate_is_idempotent() {
    let fx = fixture().await;
    let (tenant, table) = seed_tenant(&fx, "parma").await;
    let pasta = seed_product(&fx, tenant.id, "Carbonara", 9.00, Station::Kitchen, 10).await;

    let guest = customer(tenant.id, table.id, "g1");
    let scope = TenantScope::Tenant(tenant.id);
    let view = fx
        .engine
        .place_order(&guest, &scope, request(table.id, &[(pasta.id, 2)]))
        .await
        .unwrap();

    let total = fx.engine.recalculate(view.order.id).await.unwrap();
    assert_eq!(total, view.order.total_amount);
    let again = fx.engine.recalculate(view.order.id).await.unwrap();
    assert_eq!(again, total);
}
