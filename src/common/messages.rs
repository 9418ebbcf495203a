// src/common/messages.rs

// Catálogo de mensagens por código de erro. Idiomas suportados: en (padrão) e pt.
pub fn translate(code: &str, lang: &str) -> &'static str {
    match lang {
        "pt" => translate_pt(code),
        _ => translate_en(code),
    }
}

fn translate_en(code: &str) -> &'static str {
    match code {
        "VALIDATION_ERROR" => "One or more fields are invalid",
        "BAD_REQUEST" => "Malformed request",
        "UNAUTHORIZED" => "Authentication required",
        "FORBIDDEN" => "You do not have access to this resource",
        "NOT_FOUND" => "Resource not found",
        "PRODUCT_ALREADY_EXISTS" => "A product with this SKU or slug already exists",
        "EMPTY_CART" => "Your cart is empty",
        "PRODUCT_UNAVAILABLE" => "Product is not available",
        "INSUFFICIENT_STOCK" => "Insufficient stock for the requested quantity",
        "INVALID_STATUS_TRANSITION" => "This status change is not allowed",
        "INVALID_SIGNATURE" => "Invalid webhook signature",
        "ORDER_PLACEMENT_FAILED" => "Order placement failed",
        _ => "An unexpected error occurred",
    }
}

fn translate_pt(code: &str) -> &'static str {
    match code {
        "VALIDATION_ERROR" => "Um ou mais campos são inválidos",
        "BAD_REQUEST" => "Requisição malformada",
        "UNAUTHORIZED" => "Autenticação obrigatória",
        "FORBIDDEN" => "Você não tem acesso a este recurso",
        "NOT_FOUND" => "Recurso não encontrado",
        "PRODUCT_ALREADY_EXISTS" => "Já existe um produto com este SKU ou slug",
        "EMPTY_CART" => "Seu carrinho está vazio",
        "PRODUCT_UNAVAILABLE" => "Produto indisponível",
        "INSUFFICIENT_STOCK" => "Estoque insuficiente para a quantidade pedida",
        "INVALID_STATUS_TRANSITION" => "Esta mudança de status não é permitida",
        "INVALID_SIGNATURE" => "Assinatura do webhook inválida",
        "ORDER_PLACEMENT_FAILED" => "Falha ao finalizar o pedido",
        _ => "Ocorreu um erro inesperado",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(translate("EMPTY_CART", "de"), "Your cart is empty");
    }

    #[test]
    fn unknown_code_gets_generic_message() {
        assert_eq!(translate("SOMETHING_NEW", "pt"), "Ocorreu um erro inesperado");
    }
}
