//! Test fixtures: a small catalogue of shops and products.

use serde_json::{json, Value};

pub const GOOD_TOKEN: &str = "admin-session-token";

/// Shops served by the fake storefront, newest first.
pub fn shop_fixtures() -> Vec<Value> {
    vec![
        shop("shop-1", "Kigali Cement Depot", true, Some("Depot Ltd")),
        shop("shop-2", "Nyamirambo Cement & Sand", true, Some("Sand Co")),
        shop("shop-3", "Remera Roofing", false, None),
        shop("shop-4", "Cement Kings", true, Some("Kings Group")),
        shop("shop-5", "Gikondo Tiles", true, Some("")),
    ]
}

/// Products per shop id.
pub fn product_fixtures() -> Vec<Value> {
    vec![
        product("p-1", "Portland cement 50kg", "shop-1", "seller-1", json!(11500)),
        product("p-2", "Rebar 12mm", "shop-1", "seller-1", json!("8200.00")),
        product("p-3", "River sand (tonne)", "shop-2", "seller-2", json!(24000)),
        product("p-4", "Clay roof tile", "shop-3", "seller-3", json!(650)),
        product("p-5", "White cement 25kg", "shop-1", "seller-1", json!(9800)),
    ]
}

pub fn shop(id: &str, name: &str, active: bool, business_name: Option<&str>) -> Value {
    let seller = business_name.map(|b| {
        json!({
            "id": format!("seller-{}", &id[5..]),
            "businessName": b,
            "email": format!("{}@example.rw", id),
            "password": "hash-never-read"
        })
    });

    json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "phone": "+250 788 000 000",
        "isActive": active,
        "createdAt": "2025-01-15T09:30:00Z",
        "seller": seller,
    })
}

pub fn product(id: &str, name: &str, shop_id: &str, seller_id: &str, price: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{} for construction sites", name),
        "price": price,
        "thumbnailUrl": null,
        "shopId": shop_id,
        "sellerId": seller_id,
    })
}
