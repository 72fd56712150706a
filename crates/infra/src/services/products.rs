//! Product stock operations.
//!
//! Flow for every mutating call:
//!
//! ```text
//! authorize actor → fetch snapshot → consistency rule → one gateway mutation
//! ```
//!
//! "Today" is read once per operation from the injected clock, so all checks
//! of a single call agree on the date.
//!
//! Stock changes are planned against a snapshot and the gateway refuses them
//! once the stored quantity has moved on. A refused change is re-planned on a
//! fresh snapshot, so concurrent sales can never sell more than the stock.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use stockroom_auth::{Actor, Operation};
use stockroom_core::{Clock, DomainError, DomainResult, ModelName};
use stockroom_products::{
    NewProduct, Product, ProductFilter, ProductQuery, StockUpdate, check_registration,
    plan_arrival, plan_sale,
};

/// Plans per stock change before a persistent conflict is reported.
const STOCK_CHANGE_ATTEMPTS: u32 = 3;

use super::authorize;
use super::error::{ServiceError, product_store_error, store_fault};
use crate::store::{EntityStore, StoreError};

#[derive(Debug)]
pub struct ProductService<S, C> {
    store: S,
    clock: C,
}

impl<S, C> ProductService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }
}

impl<S, C> ProductService<S, C>
where
    S: EntityStore<Product>,
    C: Clock,
{
    /// Register a new model.
    ///
    /// The existence pre-check gives a clean `ProductAlreadyExists`; a writer
    /// racing past it is still stopped by the gateway's own uniqueness check.
    #[instrument(skip_all, fields(actor = %actor.username(), model = %new.model))]
    pub fn register_products(&self, actor: &Actor, new: NewProduct) -> Result<Product, ServiceError> {
        authorize(actor, &Operation::ManageInventory)?;

        let model = new.model.clone();
        let product = check_registration(new, self.clock.today())?;

        match self.store.get(&model) {
            Ok(_) => return Err(DomainError::ProductAlreadyExists(model.to_string()).into()),
            Err(StoreError::NotFound) => {}
            Err(other) => return Err(product_store_error(&model)(other)),
        }

        let created = self
            .store
            .insert(product)
            .map_err(product_store_error(&model))?;

        info!(quantity = created.quantity, arrival_date = %created.arrival_date, "product registered");
        Ok(created)
    }

    /// Record new arrivals of an existing model. Returns the new quantity.
    #[instrument(skip_all, fields(actor = %actor.username(), %model, delta = delta))]
    pub fn change_product_quantity(
        &self,
        actor: &Actor,
        model: &ModelName,
        delta: u32,
        change_date: Option<NaiveDate>,
    ) -> Result<u32, ServiceError> {
        authorize(actor, &Operation::ManageInventory)?;

        let today = self.clock.today();
        let updated = self.change_stock(model, |product| {
            plan_arrival(product, delta, change_date, today)
        })?;

        info!(quantity = updated.quantity, "product quantity increased");
        Ok(updated.quantity)
    }

    /// Sell `quantity` units of `model`. Returns the remaining quantity.
    #[instrument(skip_all, fields(actor = %actor.username(), %model, quantity = quantity))]
    pub fn sell_product(
        &self,
        actor: &Actor,
        model: &ModelName,
        quantity: u32,
        selling_date: Option<NaiveDate>,
    ) -> Result<u32, ServiceError> {
        authorize(actor, &Operation::ManageInventory)?;

        let today = self.clock.today();
        let updated = self.change_stock(model, |product| {
            plan_sale(product, quantity, selling_date, today)
        })?;

        info!(remaining = updated.quantity, "product sold");
        Ok(updated.quantity)
    }

    /// Full catalog read, including out-of-stock products.
    #[instrument(skip_all, fields(actor = %actor.username(), query = ?query))]
    pub fn get_products(&self, actor: &Actor, query: ProductQuery) -> Result<Vec<Product>, ServiceError> {
        authorize(actor, &Operation::ManageInventory)?;
        self.query(ProductFilter::new(query))
    }

    /// Catalog read restricted to products with quantity > 0.
    #[instrument(skip_all, fields(actor = %actor.username(), query = ?query))]
    pub fn get_available_products(
        &self,
        actor: &Actor,
        query: ProductQuery,
    ) -> Result<Vec<Product>, ServiceError> {
        authorize(actor, &Operation::BrowseCatalog)?;
        self.query(ProductFilter::new(query).available())
    }

    #[instrument(skip_all, fields(actor = %actor.username(), %model))]
    pub fn delete_product(&self, actor: &Actor, model: &ModelName) -> Result<bool, ServiceError> {
        authorize(actor, &Operation::ManageInventory)?;

        let deleted = self
            .store
            .delete(model)
            .map_err(product_store_error(model))?;

        info!("product deleted");
        Ok(deleted)
    }

    #[instrument(skip_all, fields(actor = %actor.username()))]
    pub fn delete_all_products(&self, actor: &Actor) -> Result<bool, ServiceError> {
        authorize(actor, &Operation::ManageInventory)?;

        let deleted = self.store.delete_all().map_err(store_fault)?;

        info!("all products deleted");
        Ok(deleted)
    }

    fn fetch(&self, model: &ModelName) -> Result<Product, ServiceError> {
        self.store.get(model).map_err(product_store_error(model))
    }

    /// Fetch, plan and write one stock change, re-planning when the write is
    /// refused as stale.
    fn change_stock<F>(&self, model: &ModelName, plan: F) -> Result<Product, ServiceError>
    where
        F: Fn(&Product) -> DomainResult<StockUpdate>,
    {
        let mut attempt = 1;
        loop {
            let product = self.fetch(model)?;
            let update = plan(&product)?;

            match self.store.update_fields(model, &update) {
                Ok(updated) => return Ok(updated),
                Err(StoreError::Conflict) if attempt < STOCK_CHANGE_ATTEMPTS => {
                    debug!(attempt, "stock changed concurrently, re-planning");
                    attempt += 1;
                }
                Err(err) => return Err(product_store_error(model)(err)),
            }
        }
    }

    /// A query pinned to one model requires that model to exist, even when the
    /// availability restriction then filters it out.
    fn query(&self, filter: ProductFilter) -> Result<Vec<Product>, ServiceError> {
        if let Some(model) = filter.query.model() {
            self.fetch(model)?;
        }
        self.store.list(&filter).map_err(store_fault)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use stockroom_auth::{NewUser, Role, User};
    use stockroom_core::{FixedClock, Username};
    use stockroom_products::Category;

    use super::*;
    use crate::store::{InMemoryStore, RecordingStore, StoreCall};

    type Store = Arc<RecordingStore<InMemoryStore<Product>>>;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 1, 10)
    }

    fn model(s: &str) -> ModelName {
        ModelName::new(s).unwrap()
    }

    fn actor(username: &str, role: Role) -> Actor {
        Actor::new(
            User::register(NewUser {
                username: Username::new(username).unwrap(),
                name: "Test".to_string(),
                surname: "User".to_string(),
                role,
            })
            .unwrap(),
        )
    }

    fn manager() -> Actor {
        actor("mgr", Role::Manager)
    }

    fn new_product(name: &str, category: Category, quantity: u32) -> NewProduct {
        NewProduct {
            model: model(name),
            category,
            quantity,
            details: None,
            selling_price: 250.0,
            arrival_date: Some(date(2024, 1, 1)),
        }
    }

    fn setup() -> (ProductService<Store, FixedClock>, Store) {
        let store = Arc::new(RecordingStore::new(InMemoryStore::new()));
        (ProductService::new(store.clone(), FixedClock::new(today())), store)
    }

    #[test]
    fn customers_cannot_manage_inventory() {
        let (svc, store) = setup();
        let carol = actor("carol", Role::Customer);

        assert_eq!(
            svc.register_products(&carol, new_product("X1", Category::Laptop, 1)),
            Err(DomainError::UserNotManagerOrAdmin.into())
        );
        assert_eq!(
            svc.delete_all_products(&carol),
            Err(DomainError::UserNotManagerOrAdmin.into())
        );
        assert!(store.calls().is_empty());
    }

    #[test]
    fn register_defaults_arrival_date() {
        let (svc, _) = setup();
        let mut req = new_product("X1", Category::Laptop, 3);
        req.arrival_date = None;

        let p = svc.register_products(&manager(), req).unwrap();
        assert_eq!(p.arrival_date, today());
    }

    #[test]
    fn register_future_arrival_is_date_error() {
        let (svc, store) = setup();
        let mut req = new_product("X1", Category::Laptop, 3);
        req.arrival_date = Some(date(2024, 1, 11));

        let err = svc.register_products(&manager(), req).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::DateError(_))));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn change_quantity_returns_new_total() {
        let (svc, store) = setup();
        svc.register_products(&manager(), new_product("X1", Category::Laptop, 3)).unwrap();
        store.reset();

        let total = svc
            .change_product_quantity(&manager(), &model("X1"), 7, Some(date(2024, 1, 2)))
            .unwrap();

        assert_eq!(total, 10);
        assert_eq!(store.calls(), vec![StoreCall::Get, StoreCall::UpdateFields]);
    }

    #[test]
    fn change_quantity_of_unknown_model_is_not_found() {
        let (svc, store) = setup();

        assert_eq!(
            svc.change_product_quantity(&manager(), &model("nope"), 1, None),
            Err(DomainError::ProductNotFound("nope".to_string()).into())
        );
        assert_eq!(store.mutations(), 0);
    }

    #[test]
    fn change_date_before_arrival_is_date_error() {
        let (svc, store) = setup();
        svc.register_products(&manager(), new_product("X1", Category::Laptop, 3)).unwrap();
        store.reset();

        let err = svc
            .change_product_quantity(&manager(), &model("X1"), 1, Some(date(2023, 12, 31)))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::DateError(_))));
        assert_eq!(store.mutations(), 0);
    }

    #[test]
    fn selling_everything_keeps_record_and_stamps_date() {
        let (svc, _) = setup();
        let mgr = manager();
        svc.register_products(&mgr, new_product("X1", Category::Smartphone, 2)).unwrap();

        assert_eq!(svc.sell_product(&mgr, &model("X1"), 2, Some(date(2024, 1, 4))), Ok(0));

        let all = svc.get_products(&mgr, ProductQuery::Model(model("X1"))).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, 0);
        assert_eq!(all[0].selling_date, Some(date(2024, 1, 4)));
    }

    #[test]
    fn grouping_and_availability() {
        let (svc, _) = setup();
        let mgr = manager();
        svc.register_products(&mgr, new_product("P1", Category::Smartphone, 1)).unwrap();
        svc.register_products(&mgr, new_product("P2", Category::Smartphone, 4)).unwrap();
        svc.register_products(&mgr, new_product("L1", Category::Laptop, 2)).unwrap();
        svc.sell_product(&mgr, &model("P1"), 1, None).unwrap();

        let phones = svc
            .get_products(&mgr, ProductQuery::Category(Category::Smartphone))
            .unwrap();
        assert_eq!(phones.len(), 2);

        let carol = actor("carol", Role::Customer);
        let available_phones = svc
            .get_available_products(&carol, ProductQuery::Category(Category::Smartphone))
            .unwrap();
        assert_eq!(available_phones.len(), 1);
        assert_eq!(available_phones[0].model, model("P2"));

        assert_eq!(svc.get_available_products(&carol, ProductQuery::All).unwrap().len(), 2);
        assert!(svc
            .get_available_products(&carol, ProductQuery::Model(model("P1")))
            .unwrap()
            .is_empty());
        assert_eq!(
            svc.get_available_products(&carol, ProductQuery::Model(model("Z9"))),
            Err(DomainError::ProductNotFound("Z9".to_string()).into())
        );
        assert_eq!(
            svc.get_products(&carol, ProductQuery::All),
            Err(DomainError::UserNotManagerOrAdmin.into())
        );
    }

    #[test]
    fn delete_product_and_delete_all() {
        let (svc, _) = setup();
        let mgr = manager();
        svc.register_products(&mgr, new_product("P1", Category::Appliance, 1)).unwrap();
        svc.register_products(&mgr, new_product("P2", Category::Appliance, 1)).unwrap();

        assert_eq!(svc.delete_product(&mgr, &model("P1")), Ok(true));
        assert_eq!(
            svc.delete_product(&mgr, &model("P1")),
            Err(DomainError::ProductNotFound("P1".to_string()).into())
        );

        assert_eq!(svc.delete_all_products(&mgr), Ok(true));
        assert!(svc.get_products(&mgr, ProductQuery::All).unwrap().is_empty());
    }

    /// Gateway that accepts every insert as a duplicate, as if another writer
    /// registered the model between the pre-check and the insert.
    struct RacingStore;

    impl EntityStore<Product> for RacingStore {
        fn get(&self, _: &ModelName) -> Result<Product, StoreError> {
            Err(StoreError::NotFound)
        }
        fn list(&self, _: &ProductFilter) -> Result<Vec<Product>, StoreError> {
            Ok(vec![])
        }
        fn insert(&self, _: Product) -> Result<Product, StoreError> {
            Err(StoreError::AlreadyExists)
        }
        fn update_fields(&self, _: &ModelName, _: &stockroom_products::StockUpdate) -> Result<Product, StoreError> {
            Err(StoreError::NotFound)
        }
        fn delete(&self, _: &ModelName) -> Result<bool, StoreError> {
            Err(StoreError::NotFound)
        }
        fn delete_where(&self, _: &ProductFilter) -> Result<usize, StoreError> {
            Ok(0)
        }
        fn delete_all(&self) -> Result<bool, StoreError> {
            Err(StoreError::Backend("connection reset".to_string()))
        }
    }

    #[test]
    fn gateway_uniqueness_race_maps_to_already_exists() {
        let svc = ProductService::new(RacingStore, FixedClock::new(today()));

        assert_eq!(
            svc.register_products(&manager(), new_product("X1", Category::Laptop, 1)),
            Err(DomainError::ProductAlreadyExists("X1".to_string()).into())
        );
    }

    #[test]
    fn backend_faults_surface_unchanged() {
        let svc = ProductService::new(RacingStore, FixedClock::new(today()));

        assert_eq!(
            svc.delete_all_products(&manager()),
            Err(ServiceError::Store(StoreError::Backend("connection reset".to_string())))
        );
    }

    /// Gateway under contention. The first `held_reads` reads wait for each
    /// other, so that many operations plan against the same snapshot before
    /// any of them writes. With `stale_writes`, every write is refused.
    struct Contended<S> {
        inner: S,
        held_reads: usize,
        reads: AtomicUsize,
        barrier: Barrier,
        stale_writes: bool,
    }

    impl<S> Contended<S> {
        fn lockstep(inner: S, held_reads: usize) -> Self {
            Self {
                inner,
                held_reads,
                reads: AtomicUsize::new(0),
                barrier: Barrier::new(held_reads),
                stale_writes: false,
            }
        }

        fn stale(inner: S) -> Self {
            Self {
                stale_writes: true,
                ..Self::lockstep(inner, 0)
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl<S: EntityStore<Product>> EntityStore<Product> for Contended<S> {
        fn get(&self, id: &ModelName) -> Result<Product, StoreError> {
            let snapshot = self.inner.get(id);
            if self.reads.fetch_add(1, Ordering::SeqCst) < self.held_reads {
                self.barrier.wait();
            }
            snapshot
        }
        fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
            self.inner.list(filter)
        }
        fn insert(&self, product: Product) -> Result<Product, StoreError> {
            self.inner.insert(product)
        }
        fn update_fields(&self, id: &ModelName, patch: &StockUpdate) -> Result<Product, StoreError> {
            if self.stale_writes {
                return Err(StoreError::Conflict);
            }
            self.inner.update_fields(id, patch)
        }
        fn delete(&self, id: &ModelName) -> Result<bool, StoreError> {
            self.inner.delete(id)
        }
        fn delete_where(&self, filter: &ProductFilter) -> Result<usize, StoreError> {
            self.inner.delete_where(filter)
        }
        fn delete_all(&self) -> Result<bool, StoreError> {
            self.inner.delete_all()
        }
    }

    fn stocked(name: &str, quantity: u32) -> InMemoryStore<Product> {
        let product = check_registration(new_product(name, Category::Smartphone, quantity), today()).unwrap();
        InMemoryStore::with_records([product]).unwrap()
    }

    #[test]
    fn concurrent_sales_never_oversell() {
        let svc = ProductService::new(Contended::lockstep(stocked("X1", 10), 2), FixedClock::new(today()));
        let mgr = manager();

        let results = thread::scope(|s| {
            let first = s.spawn(|| svc.sell_product(&mgr, &model("X1"), 10, None));
            let second = s.spawn(|| svc.sell_product(&mgr, &model("X1"), 10, None));
            [first.join().unwrap(), second.join().unwrap()]
        });

        assert_eq!(results.iter().filter(|r| **r == Ok(0)).count(), 1);
        assert!(results.contains(&Err(
            DomainError::LowProductStock { requested: 10, available: 0 }.into()
        )));

        let left = svc.get_products(&mgr, ProductQuery::Model(model("X1"))).unwrap();
        assert_eq!(left[0].quantity, 0);
    }

    #[test]
    fn concurrent_arrivals_are_both_counted() {
        let svc = ProductService::new(Contended::lockstep(stocked("X1", 1), 2), FixedClock::new(today()));
        let mgr = manager();

        thread::scope(|s| {
            let first = s.spawn(|| svc.change_product_quantity(&mgr, &model("X1"), 4, None));
            let second = s.spawn(|| svc.change_product_quantity(&mgr, &model("X1"), 5, None));
            assert!(first.join().unwrap().is_ok());
            assert!(second.join().unwrap().is_ok());
        });

        let left = svc.get_products(&mgr, ProductQuery::Model(model("X1"))).unwrap();
        assert_eq!(left[0].quantity, 10);
    }

    #[test]
    fn persistent_conflict_is_reported_after_bounded_replans() {
        let svc = ProductService::new(Contended::stale(stocked("X1", 10)), FixedClock::new(today()));

        let err = svc.sell_product(&manager(), &model("X1"), 1, None).unwrap_err();

        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
        assert_eq!(svc.store.reads(), STOCK_CHANGE_ATTEMPTS as usize);
    }
}
