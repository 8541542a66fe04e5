// src/store/record_store_tests.rs
//
// Record store scenarios: atomic writes, the single writer, live queries

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use rusqlite::Connection;
    use tokio::time::timeout;

    use crate::db::connection::create_test_pool;
    use crate::domain::{
        Category, CategoryRecord, CategoryWithMeals, MealDetail, MealRecord, MealSummary,
        MealWithIngredients,
    };
    use crate::error::{AppError, AppResult};
    use crate::events::{ChangeNotifier, EntityKind, EntityKinds};
    use crate::store::{operations, AllCategories, FavoriteMeals, MealById, Query, RecordStore};

    // ========================================================================
    // TEST HELPERS
    // ========================================================================

    const QUIET: Duration = Duration::from_millis(250);

    fn test_store() -> (tempfile::TempDir, RecordStore) {
        let (dir, pool) = create_test_pool();
        let store = RecordStore::new(Arc::new(pool), Arc::new(ChangeNotifier::new()));
        (dir, store)
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            thumbnail: Some(format!("https://www.themealdb.com/images/category/{}.png", name.to_lowercase())),
            body: None,
        }
    }

    fn summary(id: &str, name: &str) -> MealSummary {
        MealSummary {
            id: id.to_string(),
            name: Some(name.to_string()),
            thumbnail: None,
        }
    }

    fn detail(id: &str, instructions: &str, ingredients: &[&str]) -> MealDetail {
        MealDetail {
            id: id.to_string(),
            name: Some("Chocolate Gateau".to_string()),
            instructions: Some(instructions.to_string()),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            measurements: ingredients.iter().map(|_| "1 cup".to_string()).collect(),
            ..Default::default()
        }
    }

    fn category_names(categories: Vec<CategoryWithMeals>) -> Vec<String> {
        categories.into_iter().map(|c| c.category.name).collect()
    }

    fn meal_ids(meals: Vec<MealRecord>) -> Vec<String> {
        meals.into_iter().map(|m| m.id).collect()
    }

    /// Instructions "A" go with [A1, A2, A3], "B" with [B1, B2]
    fn detail_is_consistent(meal: &MealWithIngredients) -> bool {
        let names: Vec<&str> = meal.ingredients.iter().map(|i| i.name.as_str()).collect();
        match meal.meal.instructions.as_deref() {
            Some("A") => names == ["A1", "A2", "A3"],
            Some("B") => names == ["B1", "B2"],
            _ => false,
        }
    }

    struct BrokenQuery;

    impl Query for BrokenQuery {
        type Output = ();

        fn interest(&self) -> EntityKinds {
            EntityKinds::ALL
        }

        fn fetch(&self, _conn: &Connection) -> AppResult<()> {
            Err(AppError::Other("disk on fire".to_string()))
        }

        fn describe(&self) -> String {
            "BrokenQuery".to_string()
        }
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (_dir, store) = test_store();
        let categories = vec![category("1", "Beef"), category("3", "Dessert")];

        assert_eq!(store.upsert_categories(categories.clone()).await.unwrap(), 2);
        assert_eq!(store.upsert_categories(categories).await.unwrap(), 0);
        assert_eq!(store.notifier().current_sequence(), 1);
        assert_eq!(store.categories().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_detail_replaces_ingredients() {
        let (_dir, store) = test_store();

        store
            .upsert_meal_detail(detail("52776", "Melt", &["A", "B", "C"]))
            .await
            .unwrap();
        store
            .upsert_meal_detail(detail("52776", "Melt", &["X", "Y"]))
            .await
            .unwrap();

        let meal = store.meal("52776").unwrap().unwrap();
        let names: Vec<String> = meal.ingredients.into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn test_failed_detail_save_rolls_back() {
        let (_dir, store) = test_store();

        store
            .upsert_meal_detail(detail("52776", "Melt", &["A", "B", "C"]))
            .await
            .unwrap();

        // The blank second ingredient fails after the old rows were deleted
        let result = store
            .upsert_meal_detail(detail("52776", "Bake", &["X", " ", "Y"]))
            .await;
        assert!(matches!(result, Err(AppError::Domain(_))));

        let meal = store.meal("52776").unwrap().unwrap();
        assert_eq!(meal.meal.instructions.as_deref(), Some("Melt"));
        let names: Vec<String> = meal.ingredients.into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_meal_saves_create_one_category() {
        let (_dir, store) = test_store();
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert_meals(vec![summary(&format!("5277{}", i), "Tart")], "Dessert".to_string())
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let categories = store.categories().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category.name, "Dessert");
        assert_eq!(categories[0].meals.len(), 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_during_detail_saves_see_whole_snapshots() {
        let (_dir, store) = test_store();
        let store = Arc::new(store);
        store
            .upsert_meal_detail(detail("1", "A", &["A1", "A2", "A3"]))
            .await
            .unwrap();

        let mut stream = store.subscribe(MealById("1".to_string()), |meal: Option<MealWithIngredients>| meal);
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                for i in 0..200 {
                    let next = if i % 2 == 0 {
                        detail("1", "B", &["B1", "B2"])
                    } else {
                        detail("1", "A", &["A1", "A2", "A3"])
                    };
                    store.upsert_meal_detail(next).await.unwrap();
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let reader = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            tokio::task::spawn_blocking(move || {
                let mut reads = 0usize;
                loop {
                    let meal = store.meal("1").unwrap().unwrap();
                    assert!(detail_is_consistent(&meal), "torn read: {:?}", meal);
                    reads += 1;
                    if done.load(Ordering::SeqCst) {
                        break reads;
                    }
                }
            })
        };

        let mut last: Option<Option<MealWithIngredients>> = None;
        let mut emissions = 0usize;
        loop {
            match timeout(QUIET, stream.next()).await {
                Ok(Some(value)) => {
                    let value = value.unwrap();
                    let meal = value.as_ref().unwrap();
                    assert!(detail_is_consistent(meal), "torn emission: {:?}", meal);
                    assert_ne!(last.as_ref(), Some(&value));
                    last = Some(value);
                    emissions += 1;
                }
                Ok(None) => panic!("stream ended early"),
                Err(_) if writer.is_finished() => break,
                Err(_) => continue,
            }
        }

        writer.await.unwrap();
        assert!(reader.await.unwrap() > 0);
        assert!(emissions > 1);

        let settled = store.meal("1").unwrap();
        assert_eq!(settled.as_ref().and_then(|m| m.meal.instructions.as_deref()), Some("A"));
        assert_eq!(last, Some(settled));
    }

    #[tokio::test]
    async fn test_provisional_category_is_rekeyed() {
        let (_dir, store) = test_store();

        store
            .upsert_meals(vec![summary("52768", "Apple Frangipan Tart")], "Dessert".to_string())
            .await
            .unwrap();
        assert!(store.categories().unwrap()[0].category.provisional);

        store.upsert_categories(vec![category("3", "Dessert")]).await.unwrap();

        let categories = store.categories().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category.id, "3");
        assert!(!categories[0].category.provisional);
        assert_eq!(meal_ids(store.meals_in_category("3").unwrap()), vec!["52768"]);
    }

    #[tokio::test]
    async fn test_provisional_category_merges_into_existing() {
        let (_dir, store) = test_store();

        store.upsert_categories(vec![category("3", "Dessert")]).await.unwrap();
        // A provisional twin can only appear if the name lookup missed, e.g. a rename
        store
            .perform("SeedProvisional", |ctx| {
                ctx.categories()
                    .save(&CategoryRecord::provisional("Sweets"))?;
                ctx.meals().upsert_summary(&summary("52767", "Bakewell tart"), "provisional:Sweets")?;
                Ok(())
            })
            .await
            .unwrap();

        store.upsert_categories(vec![category("3", "Sweets")]).await.unwrap();

        let categories = store.categories().unwrap();
        assert_eq!(category_names(categories), vec!["Sweets"]);
        assert_eq!(meal_ids(store.meals_in_category("3").unwrap()), vec!["52767"]);
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let (_dir, store) = test_store();
        store
            .upsert_meals(vec![summary("52768", "Apple Frangipan Tart")], "Dessert".to_string())
            .await
            .unwrap();

        assert_eq!(store.toggle_favorite("52768".to_string()).await.unwrap(), Some(true));
        assert_eq!(meal_ids(store.favorite_meals().unwrap()), vec!["52768"]);
        assert_eq!(store.toggle_favorite("52768".to_string()).await.unwrap(), Some(false));
        assert!(store.favorite_meals().unwrap().is_empty());

        let before = store.notifier().current_sequence();
        assert_eq!(store.toggle_favorite("missing".to_string()).await.unwrap(), None);
        assert_eq!(store.notifier().current_sequence(), before);
    }

    // ========================================================================
    // LIVE QUERIES
    // ========================================================================

    #[tokio::test]
    async fn test_initial_value_then_updates() {
        let (_dir, store) = test_store();
        store.upsert_categories(vec![category("3", "Dessert")]).await.unwrap();

        let mut stream = store.subscribe(AllCategories, category_names);
        assert_eq!(stream.next().await.unwrap().unwrap(), vec!["Dessert"]);

        store
            .upsert_categories(vec![category("1", "Beef"), category("3", "Dessert")])
            .await
            .unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), vec!["Beef", "Dessert"]);
    }

    #[tokio::test]
    async fn test_unchanged_upsert_emits_nothing() {
        let (_dir, store) = test_store();
        let categories = vec![category("1", "Beef")];
        store.upsert_categories(categories.clone()).await.unwrap();

        let mut stream = store.subscribe(AllCategories, category_names);
        stream.next().await.unwrap().unwrap();

        store.upsert_categories(categories).await.unwrap();
        assert!(timeout(QUIET, stream.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_projection_hides_irrelevant_churn() {
        let (_dir, store) = test_store();
        store.upsert_categories(vec![category("1", "Beef")]).await.unwrap();

        let mut stream = store.subscribe(AllCategories, category_names);
        stream.next().await.unwrap().unwrap();

        // Meals change, category names do not
        store
            .upsert_meals(vec![summary("52874", "Beef and Mustard Pie")], "Beef".to_string())
            .await
            .unwrap();
        assert!(timeout(QUIET, stream.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_net_zero_toggle_emits_nothing() {
        let (_dir, store) = test_store();
        store
            .upsert_meals(vec![summary("52768", "Apple Frangipan Tart")], "Dessert".to_string())
            .await
            .unwrap();

        let mut stream = store.subscribe(FavoriteMeals, meal_ids);
        assert!(stream.next().await.unwrap().unwrap().is_empty());

        let liked = store
            .perform("ToggleTwice", |ctx| {
                let now = chrono::Utc::now();
                operations::toggle_favorite(ctx, "52768", now)?;
                operations::toggle_favorite(ctx, "52768", now)
            })
            .await
            .unwrap();
        assert_eq!(liked, Some(false));
        assert!(timeout(QUIET, stream.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_subscribe_from_skips_known_initial_value() {
        let (_dir, store) = test_store();
        store.upsert_categories(vec![category("1", "Beef")]).await.unwrap();

        let mut stream = store.subscribe_from(AllCategories, Some(vec!["Beef".to_string()]), category_names);
        assert!(timeout(QUIET, stream.next()).await.is_err());

        store.upsert_categories(vec![category("2", "Chicken")]).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), vec!["Beef", "Chicken"]);
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let (_dir, store) = test_store();
        let mut stream = store.subscribe(AllCategories, category_names);
        stream.next().await.unwrap().unwrap();
        assert_eq!(store.notifier().listener_count(), 1);

        stream.cancel();
        stream.cancel();
        assert_eq!(store.notifier().listener_count(), 0);

        store.upsert_categories(vec![category("1", "Beef")]).await.unwrap();
        assert!(stream.next().await.is_none());
        assert!(stream.try_next().is_none());
    }

    #[tokio::test]
    async fn test_drop_unregisters_listener() {
        let (_dir, store) = test_store();
        let stream = store.subscribe(FavoriteMeals, meal_ids);
        assert_eq!(store.notifier().listener_count(), 1);

        drop(stream);
        assert_eq!(store.notifier().listener_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_are_independent() {
        let (_dir, store) = test_store();
        store
            .upsert_meals(vec![summary("52768", "Apple Frangipan Tart")], "Dessert".to_string())
            .await
            .unwrap();

        let mut ids = store.subscribe(FavoriteMeals, meal_ids);
        let mut count = store.subscribe(FavoriteMeals, |meals: Vec<MealRecord>| meals.len());
        assert!(ids.next().await.unwrap().unwrap().is_empty());
        assert_eq!(count.next().await.unwrap().unwrap(), 0);

        count.cancel();
        store.toggle_favorite("52768".to_string()).await.unwrap();

        assert_eq!(ids.next().await.unwrap().unwrap(), vec!["52768"]);
        assert!(count.next().await.is_none());
    }

    #[tokio::test]
    async fn test_single_meal_stream_follows_detail_saves() {
        let (_dir, store) = test_store();

        let mut stream = store.subscribe(
            MealById("52776".to_string()),
            |meal: Option<MealWithIngredients>| meal.map(|m| m.ingredients.len()),
        );
        assert_eq!(stream.next().await.unwrap().unwrap(), None);

        store
            .upsert_meal_detail(detail("52776", "Melt", &["A", "B", "C"]))
            .await
            .unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_deliveries_follow_commit_order() {
        let (_dir, store) = test_store();
        let mut stream = store.subscribe(AllCategories, |c: Vec<CategoryWithMeals>| c.len());
        assert_eq!(stream.next().await.unwrap().unwrap(), 0);

        for i in 1..=5 {
            store
                .upsert_categories(vec![category(&i.to_string(), &format!("Category {}", i))])
                .await
                .unwrap();
        }

        // Intermediate values may be coalesced, never reordered
        let mut last = 0;
        while last < 5 {
            let value = stream.next().await.unwrap().unwrap();
            assert!(value > last);
            last = value;
        }
    }

    #[tokio::test]
    async fn test_failing_query_errors_once() {
        let (_dir, store) = test_store();
        let mut stream = store.subscribe(BrokenQuery, |_: ()| ());

        assert!(matches!(stream.next().await, Some(Err(AppError::Other(_)))));
        assert!(stream.next().await.is_none());
        assert!(stream.is_finished());
    }

    #[tokio::test]
    async fn test_interest_filters_recomputation() {
        let (_dir, store) = test_store();
        let (_, mut changes) = store
            .notifier()
            .register("categories-only", EntityKinds::of(EntityKind::Category));

        store
            .perform("MealOnly", |ctx| {
                ctx.mark_changed(EntityKind::Meal);
                Ok(())
            })
            .await
            .unwrap();
        assert!(changes.try_recv().is_err());
    }
}
