// src/common/validation.rs

use validator::ValidationError;

// Campo obrigatório que não pode ser só espaços (nome do hóspede, telefone, usuário)
pub fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Trường này không được để trống.".into());
        return Err(err);
    }
    Ok(())
}
