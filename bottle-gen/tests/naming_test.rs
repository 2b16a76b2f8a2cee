use bottle_gen::naming::{
    SINGULAR_RULES, UNCOUNTABLE, pluralize, resource_segment, singularize, strip_id_suffix, to_camel_case,
    to_pascal_case,
};

fn assert_singular(pairs: &[(&str, &str)]) {
    for (plural, singular) in pairs {
        assert_eq!(singularize(plural), *singular, "singularize({plural})");
    }
}

#[test]
fn test_pascal_case() {
    assert_eq!(to_pascal_case("user_account"), "UserAccount");
    assert_eq!(to_pascal_case("product_category"), "ProductCategory");
    assert_eq!(to_pascal_case("order_item"), "OrderItem");
    assert_eq!(to_pascal_case("user"), "User");
    assert_eq!(to_pascal_case("a"), "A");
    assert_eq!(to_pascal_case("user_account_details"), "UserAccountDetails");
    assert_eq!(to_pascal_case("user__account"), "UserAccount");
    assert_eq!(to_pascal_case("product___category"), "ProductCategory");
    assert_eq!(to_pascal_case("tipo_dado"), "TipoDado");
    assert_eq!(to_pascal_case("user2_account"), "User2Account");
    assert_eq!(to_pascal_case("product123_category"), "Product123Category");
    assert_eq!(to_pascal_case("USER_ACCOUNT"), "UserAccount");
    assert_eq!(to_pascal_case(""), "");
}

#[test]
fn test_camel_case() {
    assert_eq!(to_camel_case("papel_empresa_id"), "papelEmpresaId");
    assert_eq!(to_camel_case("created_at"), "createdAt");
    assert_eq!(to_camel_case("ID"), "id");
    assert_eq!(to_camel_case("razao__social"), "razaoSocial");
    assert_eq!(to_camel_case(""), "");
}

#[test]
fn test_singularize_nasal_plurals() {
    assert_singular(&[
        ("lotações", "lotação"),
        ("situações", "situação"),
        ("funções", "função"),
        ("operações", "operação"),
        ("corações", "coração"),
        ("paixões", "paixão"),
        ("ações", "ação"),
        ("informações", "informação"),
        ("documentações", "documentação"),
        ("configurações", "configuração"),
        ("lotacoes", "lotacao"),
        ("situacoes", "situacao"),
        ("funcoes", "funcao"),
        ("irmãos", "irmão"),
        ("mãos", "mão"),
        ("alemães", "alemão"),
        ("cidadãos", "cidadão"),
        ("cães", "cão"),
        ("pães", "pão"),
    ]);
}

#[test]
fn test_singularize_l_endings() {
    assert_singular(&[
        ("animais", "animal"),
        ("naturais", "natural"),
        ("comerciais", "comercial"),
        ("papéis", "papel"),
        ("hotéis", "hotel"),
        ("fiéis", "fiel"),
        ("espanhóis", "espanhol"),
        ("azuis", "azul"),
        ("pauis", "paul"),
        ("funis", "funil"),
        ("barris", "barril"),
        ("perfis", "perfil"),
    ]);
}

#[test]
fn test_singularize_consonant_endings() {
    assert_singular(&[
        ("homens", "homem"),
        ("itens", "item"),
        ("nuvens", "nuvem"),
        ("mulheres", "mulher"),
        ("luzes", "luz"),
        ("rapazes", "rapaz"),
        ("gases", "gás"),
    ]);
}

#[test]
fn test_singularize_nationalities() {
    assert_singular(&[
        ("japoneses", "japonês"),
        ("ingleses", "inglês"),
        ("portugueses", "português"),
        ("dinamarqueses", "dinamarquês"),
    ]);
    // Already singular: the generic rule must not eat the accented "s".
    assert_eq!(singularize("português"), "português");
}

#[test]
fn test_singularize_regular_and_irregular() {
    assert_singular(&[
        ("carros", "carro"),
        ("casas", "casa"),
        ("livros", "livro"),
        ("mesas", "mesa"),
        ("análises", "análise"),
        ("crises", "crise"),
        ("países", "país"),
        ("males", "mal"),
    ]);
}

#[test]
fn test_singularize_leaves_singular_and_uncountable_words() {
    for word in UNCOUNTABLE {
        assert_eq!(singularize(word), *word);
    }
    assert_eq!(singularize("status"), "status");
    assert_eq!(singularize("ônibus"), "ônibus");
    assert_eq!(singularize("casa"), "casa");
    assert_eq!(singularize("computador"), "computador");
    assert_eq!(singularize("água"), "água");
    assert_eq!(singularize(""), "");
    assert_eq!(singularize("   "), "   ");
}

#[test]
fn test_singularize_adapts_case() {
    assert_eq!(singularize("LOTAÇÕES"), "LOTAÇÃO");
    assert_eq!(singularize("Casas"), "Casa");
    assert_eq!(singularize("ANIMAIS"), "ANIMAL");
    assert_eq!(singularize("HOMENS"), "HOMEM");
    assert_eq!(singularize("Países"), "País");
    assert_eq!(singularize("PapelEmpresas"), "PapelEmpresa");
    assert_eq!(singularize("Perfis"), "Perfil");
}

/// One word per suffix rule, each of which would be mangled if a later, more generic rule
/// fired first.
#[test]
fn test_every_singular_rule_wins_over_the_generic_one() {
    let cases = [
        ("japoneses", "japonês"),
        ("lotações", "lotação"),
        ("irmãos", "irmão"),
        ("capitães", "capitão"),
        ("lotacoes", "lotacao"),
        ("animais", "animal"),
        ("papéis", "papel"),
        ("lençóis", "lençol"),
        ("azuis", "azul"),
        ("luzes", "luz"),
        ("jardins", "jardim"),
        ("gases", "gás"),
        ("funis", "funil"),
        ("mesas", "mesa"),
    ];
    assert_eq!(cases.len(), SINGULAR_RULES.len());
    assert_singular(&cases);
}

#[test]
fn test_pluralize() {
    let pairs = [
        ("lotação", "lotações"),
        ("animal", "animais"),
        ("papel", "papéis"),
        ("espanhol", "espanhóis"),
        ("azul", "azuis"),
        ("funil", "funis"),
        ("mulher", "mulheres"),
        ("luz", "luzes"),
        ("homem", "homens"),
        ("item", "itens"),
        ("japonês", "japoneses"),
        ("casa", "casas"),
        ("carro", "carros"),
        ("país", "países"),
        ("Perfil", "Perfis"),
        ("PapelEmpresa", "PapelEmpresas"),
        ("status", "status"),
    ];
    for (singular, plural) in pairs {
        assert_eq!(pluralize(singular), plural, "pluralize({singular})");
    }
    assert_eq!(pluralize(""), "");
}

#[test]
fn test_pluralize_then_singularize_for_regular_words() {
    for word in ["lotação", "animal", "papel", "funil", "luz", "item", "casa", "japonês", "país"] {
        assert_eq!(singularize(&pluralize(word)), word, "round trip of {word}");
    }
}

#[test]
fn test_identifier_suffixes_and_resource_segments() {
    let suffixes = vec!["_id".to_string()];
    assert_eq!(strip_id_suffix("papel_empresa_id", &suffixes), "papel_empresa");
    assert_eq!(strip_id_suffix("PAPEL_ID", &suffixes), "PAPEL");
    assert_eq!(strip_id_suffix("responsavel", &suffixes), "responsavel");
    assert_eq!(strip_id_suffix("_id", &suffixes), "_id");

    assert_eq!(resource_segment("Perfil"), "perfis");
    assert_eq!(resource_segment("PapelEmpresa"), "papel-empresas");
    assert_eq!(resource_segment("Empresa"), "empresas");
}
