use std::sync::Arc;

use super::ServiceError;
use crate::database::models::Product;
use crate::dto::{ListItemsOutput, ProductInput, ProductOutput};
use crate::filter::Filter;
use crate::repository::ProductRepository;

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list(&self, filter: &Filter) -> Result<ListItemsOutput<ProductOutput>, ServiceError> {
        let count = self.products.count_products(filter).await?;
        let items = self.products.get_products(filter).await?;

        Ok(ListItemsOutput {
            items: items.iter().map(ProductOutput::from).collect(),
            count,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Product, ServiceError> {
        Ok(self.products.get_product_by_id(id).await?)
    }

    pub async fn create(&self, input: &ProductInput) -> Result<ProductOutput, ServiceError> {
        let mut product = Product::default();
        product.bind(input)?;

        let created = self.products.create_product(&product).await?;
        Ok(ProductOutput::from(&created))
    }

    pub async fn update(&self, product: &Product, input: &ProductInput) -> Result<ProductOutput, ServiceError> {
        let mut product = product.clone();
        product.bind(input)?;

        let updated = self.products.update_product(&product).await?;
        Ok(ProductOutput::from(&updated))
    }

    pub async fn delete(&self, product: &Product) -> Result<(), ServiceError> {
        Ok(self.products.delete_product(product).await?)
    }
}
