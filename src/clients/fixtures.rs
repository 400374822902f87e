//! Minimal catalog records for scripting [`MockCatalog`](crate::clients::MockCatalog).

use crate::model::{
    CategoryWithParents, CommentUser, CommentWithUser, ProductCategory, ProductDetail, ProductId,
    ProductSummary,
};
use chrono::{DateTime, Utc};

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// An active, in-stock product with no offer.
pub fn product_summary(id: u64, name: &str) -> ProductSummary {
    ProductSummary {
        id: ProductId(id),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        price: 100.0,
        description: String::new(),
        is_active: true,
        created_at: epoch(),
        updated_at: epoch(),
        subcategory_id: 1,
        subcategory: None,
        average_score: 0.0,
        total_quantity: 10,
        offer: None,
        main_image: None,
        store: None,
    }
}

/// A bare product detail in a single root category.
pub fn product_detail(id: u64, name: &str) -> ProductDetail {
    ProductDetail {
        id: ProductId(id),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        price: 100.0,
        description: String::new(),
        is_active: true,
        created_at: epoch(),
        updated_at: epoch(),
        subcategory_id: 1,
        subcategory: CategoryWithParents {
            category: ProductCategory {
                id: 1,
                name: "Panels".to_string(),
                image_name: None,
                created_at: epoch(),
                updated_at: epoch(),
                parent_category_id: None,
            },
            parent_category: None,
        },
        specs: Vec::new(),
        tags: Vec::new(),
        variants: Vec::new(),
        attributes: Vec::new(),
        offer: None,
        images: Vec::new(),
        store: None,
    }
}

pub fn comment(id: u64, product_id: u64) -> CommentWithUser {
    CommentWithUser {
        id,
        scoring: 5,
        comment: Some(format!("comment {id}")),
        created_at: epoch(),
        updated_at: epoch(),
        product_id: ProductId(product_id),
        user: CommentUser {
            id: 1,
            full_name: Some("Ada".to_string()),
            created_at: epoch(),
            updated_at: epoch(),
        },
    }
}

/// Comments `first..first + count` on `product_id`, in id order.
pub fn comment_page(product_id: u64, first: u64, count: u64) -> Vec<CommentWithUser> {
    (first..first + count).map(|id| comment(id, product_id)).collect()
}
