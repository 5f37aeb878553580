use async_graphql::{EmptyMutation, EmptySubscription, Object, Result, Schema};
use rand::Rng;

pub type DiceSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema() -> DiceSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// A basic GraphQL object.
    async fn hello(&self) -> &'static str {
        "Hello world!"
    }

    /// Another basic GraphQL object.
    async fn extra(&self) -> &'static str {
        "Extra!"
    }

    /// Rolls `dice` dice, each with `sides` sides (six when omitted).
    async fn roll_dice(&self, dice: i32, sides: Option<i32>) -> Result<Vec<i32>> {
        let sides = sides.unwrap_or(6);
        if dice < 0 {
            return Err("dice must not be negative".into());
        }
        if sides < 1 {
            return Err("sides must be at least 1".into());
        }

        let mut rng = rand::thread_rng();
        Ok((0..dice).map(|_| rng.gen_range(1..=sides)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::build_schema;
    use async_graphql::{Request, Variables};

    #[tokio::test]
    async fn hello_and_extra_resolve() {
        let schema = build_schema();
        let response = schema.execute("{ hello extra }").await;

        assert!(response.errors.is_empty());
        let data = serde_json::to_value(response.data).unwrap();
        assert_eq!(data["hello"], "Hello world!");
        assert_eq!(data["extra"], "Extra!");
    }

    #[tokio::test]
    async fn roll_dice_respects_count_and_bounds() {
        let schema = build_schema();
        let request = Request::new(
            "query RollDice($dice: Int!, $sides: Int) { rollDice(dice: $dice, sides: $sides) }",
        )
        .variables(Variables::from_json(
            serde_json::json!({ "dice": 8, "sides": 9 }),
        ));
        let response = schema.execute(request).await;

        assert!(response.errors.is_empty());
        let data = serde_json::to_value(response.data).unwrap();
        let rolls = data["rollDice"].as_array().expect("rollDice array");
        assert_eq!(rolls.len(), 8);
        assert!(rolls
            .iter()
            .all(|roll| (1..=9).contains(&roll.as_i64().unwrap())));
    }

    #[tokio::test]
    async fn roll_dice_defaults_to_six_sides() {
        let schema = build_schema();
        let response = schema.execute("{ rollDice(dice: 100) }").await;

        assert!(response.errors.is_empty());
        let data = serde_json::to_value(response.data).unwrap();
        let rolls = data["rollDice"].as_array().expect("rollDice array");
        assert_eq!(rolls.len(), 100);
        assert!(rolls
            .iter()
            .all(|roll| (1..=6).contains(&roll.as_i64().unwrap())));
    }

    #[tokio::test]
    async fn roll_dice_rejects_zero_sides() {
        let schema = build_schema();
        let response = schema.execute("{ rollDice(dice: 1, sides: 0) }").await;

        assert!(!response.errors.is_empty());
        assert!(response.errors[0].message.contains("sides"));
    }
}
