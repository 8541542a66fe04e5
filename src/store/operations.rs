// src/store/operations.rs
//
// Write operations
//
// Each function runs inside one WriteContext (one transaction). They mark
// an entity kind as changed only when a row actually changed.

use chrono::{DateTime, Utc};

use crate::domain::{
    validate_category, validate_category_name, validate_ingredient_line, validate_meal_detail,
    validate_meal_summary, Category, CategoryId, CategoryRecord, IngredientRecord, MealDetail,
    MealSummary,
};
use crate::error::AppResult;
use crate::events::EntityKind;
use crate::services::write_coordinator::WriteContext;

/// Upsert categories by id.
///
/// A provisional record with the same name is folded into the real one:
/// re-keyed when the real id is new, otherwise its meals move over and it
/// is removed.
pub fn upsert_categories(ctx: &mut WriteContext<'_>, categories: &[Category]) -> AppResult<usize> {
    let mut changed = 0;

    for category in categories {
        validate_category(category)?;
        reconcile_provisional(ctx, category)?;

        if ctx.categories().save(&CategoryRecord::from(category))? > 0 {
            ctx.mark_changed(EntityKind::Category);
            changed += 1;
        }
    }

    Ok(changed)
}

fn reconcile_provisional(ctx: &mut WriteContext<'_>, category: &Category) -> AppResult<()> {
    let repo = ctx.categories();
    let Some(provisional) = repo.find_provisional_by_name(&category.name)? else {
        return Ok(());
    };
    if provisional.id == category.id {
        return Ok(());
    }

    let linked_meals = ctx.meals().list_by_category(&provisional.id)?.len();

    if repo.get_by_id(&category.id)?.is_some() {
        ctx.meals().move_category(&provisional.id, &category.id)?;
        repo.delete(&provisional.id)?;
    } else {
        // meals follow through ON UPDATE CASCADE
        repo.rekey(&provisional.id, &category.id)?;
    }

    log::info!(
        "Category '{}' resolved from {} to {} ({} meals)",
        category.name,
        provisional.id,
        category.id,
        linked_meals
    );

    ctx.mark_changed(EntityKind::Category);
    if linked_meals > 0 {
        ctx.mark_changed(EntityKind::Meal);
    }
    Ok(())
}

/// Find or create the category by name, then upsert and link each meal
pub fn upsert_meals(
    ctx: &mut WriteContext<'_>,
    meals: &[MealSummary],
    category_name: &str,
) -> AppResult<usize> {
    validate_category_name(category_name)?;
    let category_id = find_or_create_category(ctx, category_name)?;

    let mut changed = 0;
    for meal in meals {
        validate_meal_summary(meal)?;
        if ctx.meals().upsert_summary(meal, &category_id)? > 0 {
            ctx.mark_changed(EntityKind::Meal);
            changed += 1;
        }
    }

    Ok(changed)
}

fn find_or_create_category(ctx: &mut WriteContext<'_>, name: &str) -> AppResult<CategoryId> {
    if let Some(existing) = ctx.categories().find_by_name(name)? {
        return Ok(existing.id);
    }

    let record = CategoryRecord::provisional(name);
    ctx.categories().save(&record)?;
    ctx.mark_changed(EntityKind::Category);
    log::debug!("Created provisional category {}", record.id);

    Ok(record.id)
}

/// Upsert all detail fields and replace the ingredient list.
///
/// The old ingredient rows are deleted before the new ones are inserted;
/// a failure anywhere rolls the whole replacement back.
pub fn upsert_meal_detail(ctx: &mut WriteContext<'_>, meal: &MealDetail) -> AppResult<usize> {
    validate_meal_detail(meal)?;

    let mut changed = 0;
    if ctx.meals().upsert_detail(meal)? > 0 {
        ctx.mark_changed(EntityKind::Meal);
        changed += 1;
    }

    let lines = meal.ingredient_lines();
    let records: Vec<IngredientRecord> = lines
        .iter()
        .map(|line| IngredientRecord::from_line(&meal.id, line))
        .collect();

    let ingredients = ctx.ingredients();
    if ingredients.list_by_meal(&meal.id)? == records {
        return Ok(changed);
    }

    ingredients.delete_by_meal(&meal.id)?;
    for (line, record) in lines.iter().zip(records.iter()) {
        validate_ingredient_line(line)?;
        ingredients.insert(record)?;
    }
    ctx.mark_changed(EntityKind::Ingredient);

    Ok(changed + records.len())
}

/// Flip the favorite timestamp. `None` when the meal does not exist.
pub fn toggle_favorite(
    ctx: &mut WriteContext<'_>,
    meal_id: &str,
    now: DateTime<Utc>,
) -> AppResult<Option<bool>> {
    let Some(mut meal) = ctx.meals().get_by_id(meal_id)? else {
        log::debug!("Toggle favorite ignored, meal {} not stored", meal_id);
        return Ok(None);
    };

    let liked = meal.toggle_like(now);
    ctx.meals().set_liked_at(&meal.id, meal.liked_at)?;
    ctx.mark_changed(EntityKind::Meal);

    Ok(Some(liked))
}
