// src/services/stock.rs

use crate::{common::error::AppError, models::catalog::Product};

/// Confere se a linha pode ser atendida com o saldo atual.
///
/// Produto inativo é sempre indisponível, mesmo com saldo. A baixa de verdade
/// acontece no commit (`ProductRepository::decrement_stock`), que repete a
/// condição dentro da transação.
pub fn check_stock(product: &Product, requested: i32) -> Result<(), AppError> {
    if requested <= 0 {
        return Err(AppError::BadRequest("A quantidade deve ser maior que zero.".into()));
    }
    if !product.is_active {
        return Err(AppError::ProductUnavailable { product_id: product.id });
    }
    if product.total_stock < requested {
        return Err(AppError::InsufficientStock {
            product_id: product.id,
            available: product.total_stock.max(0),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::priced;

    #[test]
    fn exact_stock_is_enough() {
        let p = priced("10.00", 3);
        assert!(check_stock(&p, 3).is_ok());
        assert!(check_stock(&p, 1).is_ok());
    }

    #[test]
    fn reports_what_is_left() {
        let p = priced("10.00", 5);
        match check_stock(&p, 6) {
            Err(AppError::InsufficientStock { product_id, available }) => {
                assert_eq!(product_id, p.id);
                assert_eq!(available, 5);
            }
            other => panic!("esperava InsufficientStock, veio {:?}", other),
        }
    }

    #[test]
    fn inactive_products_are_unavailable() {
        let mut p = priced("10.00", 50);
        p.is_active = false;
        assert!(matches!(
            check_stock(&p, 1),
            Err(AppError::ProductUnavailable { .. })
        ));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let p = priced("10.00", 5);
        assert!(matches!(check_stock(&p, 0), Err(AppError::BadRequest(_))));
    }
}
