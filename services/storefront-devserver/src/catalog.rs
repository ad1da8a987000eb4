use sf_api_types::ProductId;
use sf_sync::Money;

/// Pseudo-category that selects every product with an active offer.
pub const OFFERS_SLUG: &str = "ofertas";

#[derive(Debug, Clone)]
pub struct Category {
    pub slug: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: &'static str,
    pub category: &'static str,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub stock: u32,
    pub images: Vec<String>,
}

impl Product {
    /// The price a cart line is charged at.
    pub fn current_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }

    pub fn on_sale(&self) -> bool {
        self.sale_price.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Small fixed catalogue used by the devserver and its tests.
    pub fn seeded() -> Self {
        let categories = vec![
            Category {
                slug: "sillas",
                name: "Sillas",
            },
            Category {
                slug: "mesas",
                name: "Mesas",
            },
            Category {
                slug: "lamparas",
                name: "Lámparas",
            },
            Category {
                slug: "exterior",
                name: "Exterior",
            },
        ];

        let products = vec![
            product(1, "Silla Nórdica", "sillas", 1000, None, 5, &[
                "/media/productos/silla-1.jpg",
                "/media/productos/silla-2.jpg",
            ]),
            product(2, "Silla Plegable", "sillas", 450, Some(399), 12, &[
                "/media/productos/plegable.jpg",
            ]),
            product(3, "Mesa de Roble", "mesas", 25_900, None, 2, &[
                "/media/productos/mesa-1.jpg",
                "/media/productos/mesa-2.jpg",
                "/media/productos/mesa-3.jpg",
            ]),
            product(4, "Lámpara de Pie", "lamparas", 3_250, Some(2_800), 7, &[]),
            product(5, "Mesa Auxiliar", "mesas", 6_400, None, 0, &[
                "/media/productos/auxiliar.jpg",
            ]),
        ];

        Self::new(categories, products)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products for a grid filter. `None` when `category` names no category;
    /// an empty or missing category selects everything.
    pub fn filter(&self, category: Option<&str>, query: Option<&str>) -> Option<Vec<&Product>> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        if let Some(slug) = category {
            if slug != OFFERS_SLUG && !self.categories.iter().any(|c| c.slug == slug) {
                return None;
            }
        }
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        Some(
            self.products
                .iter()
                .filter(|p| match category {
                    Some(OFFERS_SLUG) => p.on_sale(),
                    Some(slug) => p.category == slug,
                    None => true,
                })
                .filter(|p| {
                    needle
                        .as_deref()
                        .is_none_or(|n| p.name.to_lowercase().contains(n))
                })
                .collect(),
        )
    }
}

fn product(
    id: u64,
    name: &'static str,
    category: &'static str,
    cents: i64,
    sale: Option<i64>,
    stock: u32,
    images: &[&str],
) -> Product {
    Product {
        id: ProductId(id),
        name,
        category,
        price: Money::from_cents(cents),
        sale_price: sale.map(Money::from_cents),
        stock,
        images: images.iter().map(|url| (*url).to_owned()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(products: &[&Product]) -> Vec<u64> {
        products.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn offers_select_products_on_sale() {
        let catalog = Catalog::seeded();
        assert_eq!(ids(&catalog.filter(Some("ofertas"), None).unwrap()), vec![2, 4]);
    }

    #[test]
    fn unknown_category_is_rejected_and_blank_means_all() {
        let catalog = Catalog::seeded();
        assert!(catalog.filter(Some("sofas"), None).is_none());
        assert_eq!(catalog.filter(Some(" "), None).unwrap().len(), catalog.products().len());
    }

    #[test]
    fn category_without_products_is_empty_not_missing() {
        let catalog = Catalog::seeded();
        assert!(catalog.filter(Some("exterior"), None).unwrap().is_empty());
    }

    #[test]
    fn query_narrows_case_insensitively() {
        let catalog = Catalog::seeded();
        assert_eq!(ids(&catalog.filter(Some("mesas"), Some("ROBLE")).unwrap()), vec![3]);
    }

    #[test]
    fn sale_price_wins() {
        let catalog = Catalog::seeded();
        let plegable = catalog.product(ProductId(2)).unwrap();
        assert_eq!(plegable.current_price(), Money::from_cents(399));
    }
}
