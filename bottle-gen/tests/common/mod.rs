#![allow(dead_code)]

use bottle_gen::{Column, ForeignKey, MemoryCatalog, SequenceBinding, Table, UniqueConstraint};

/// `desmonte.perfis`: sequence-backed key, bounded description and a creation timestamp.
pub fn perfis() -> Table {
    Table::new("desmonte", "perfis")
        .with_column(
            Column::new("id", "integer").not_null().default_value("nextval('desmonte.perfis_id_seq'::regclass)"),
        )
        .with_column(Column::new("descricao", "character varying").max_length(100).not_null())
        .with_column(Column::new("created_at", "timestamp").not_null())
        .with_primary_key(["id"])
        .with_sequence(SequenceBinding::new("id", "desmonte", "perfis_id_seq"))
}

/// `public.papel_empresas`: bigint key and a unique name.
pub fn papel_empresas() -> Table {
    Table::new("public", "papel_empresas")
        .with_column(
            Column::new("id", "bigint").not_null().default_value("nextval('papel_empresas_id_seq'::regclass)"),
        )
        .with_column(Column::new("nome", "character varying").max_length(60).not_null())
        .with_primary_key(["id"])
        .with_unique(UniqueConstraint::new("papel_empresas_nome_key", ["nome"]))
}

/// `public.empresas`: references `papel_empresas`, has audit columns, a unique document
/// number and a defaulted state code. No sequence binding is reported for its key.
pub fn empresas() -> Table {
    Table::new("public", "empresas")
        .with_column(Column::new("id", "bigint").not_null().default_value("nextval('empresas_id_seq'::regclass)"))
        .with_column(Column::new("razao_social", "character varying").max_length(150).not_null())
        .with_column(Column::new("cnpj", "character varying").max_length(14).not_null())
        .with_column(Column::new("uf", "character varying").max_length(2).default_value("'CE'::character varying"))
        .with_column(Column::new("capital_social", "numeric").numeric(15, 2))
        .with_column(Column::new("papel_empresa_id", "bigint").not_null())
        .with_column(Column::new("created_at", "timestamp").not_null())
        .with_column(Column::new("updated_at", "timestamp"))
        .with_primary_key(["id"])
        .with_foreign_key(
            ForeignKey::new("papel_empresa_id", "public", "papel_empresas", "id").named("empresa_papel_empresa_fk"),
        )
        .with_unique(UniqueConstraint::new("empresas_cnpj_key", ["cnpj"]))
}

pub fn catalog() -> MemoryCatalog {
    MemoryCatalog::new().with_table(perfis()).with_table(papel_empresas()).with_table(empresas())
}
