use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One order line. Price and count are snapshotted at ordering time because
/// the catalog price may change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub order_price: Decimal,
    pub count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Model {
    pub fn line_total(&self) -> Decimal {
        self.order_price * Decimal::from(self.count)
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(price: Decimal, count: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            order_price: price,
            count,
        }
    }

    #[test]
    fn line_total_multiplies_price_by_count() {
        assert_eq!(line(dec!(10000), 3).line_total(), dec!(30000));
        assert_eq!(line(dec!(19.99), 2).line_total(), dec!(39.98));
    }

    #[test]
    fn line_total_of_single_unit_is_the_price() {
        assert_eq!(line(dec!(25000), 1).line_total(), dec!(25000));
    }
}
