use std::sync::LazyLock;
use ustr::Ustr;

macro_rules! str_const {
    ($($name:ident = $str:literal);*; ) => {
        $(pub static $name: LazyLock<Ustr> = LazyLock::new(|| Ustr::from($str));)*
    };
}

// Logical operators:
str_const! {
    AND = "AND";
    OR = "OR";
    IMPL = "IMPL";
    EQUI = "EQUI";
    NOT = "NOT";
    PREDVAR = "PREDVAR";
    PREDCON = "PREDCON";
    EXISTS = "EXISTS";
    EXISTSU = "EXISTSU";
    FORALL = "FORALL";
}

// Term operators:
str_const! {
    VAR = "VAR";
    FUNVAR = "FUNVAR";
    FUNCON = "FUNCON";
    CLASS = "CLASS";
}

// Module document fields:
str_const! {
    FORMULA = "formula";
    TERM = "term";
}

str_const! {
    CONFIG_FILE_NAME = "wff.toml";
    LOG_ENV = "WFF_LOG";
}

// Names assumed by the syntax-only oracle:
str_const! {
    EQUAL = "equal";
}
