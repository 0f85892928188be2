//! Entity names understood by the dispatcher.

/// Label-only reference tables (`id` + `libelle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Genre,
    Public,
    Rayon,
    Suivi,
    Etat,
}

impl LookupTable {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Public => "public",
            Self::Rayon => "rayon",
            Self::Suivi => "suivi",
            Self::Etat => "etat",
        }
    }
}

/// A logical entity, resolved from the name a caller passes in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Book,
    Dvd,
    Periodical,
    Copy,
    Order,
    DocumentOrder,
    Subscription,
    Lookup(LookupTable),
    User,
    /// Any other name, handled as a plain single table.
    Table(String),
}

impl Entity {
    /// Resolve an entity name. Unknown names become [`Entity::Table`].
    pub fn parse(name: &str) -> Self {
        match name {
            "livre" => Self::Book,
            "dvd" => Self::Dvd,
            "revue" => Self::Periodical,
            "exemplaire" => Self::Copy,
            "commande" => Self::Order,
            "commandedocument" => Self::DocumentOrder,
            "abonnement" => Self::Subscription,
            "genre" => Self::Lookup(LookupTable::Genre),
            "public" => Self::Lookup(LookupTable::Public),
            "rayon" => Self::Lookup(LookupTable::Rayon),
            "suivi" => Self::Lookup(LookupTable::Suivi),
            "etat" => Self::Lookup(LookupTable::Etat),
            "utilisateur" => Self::User,
            other => Self::Table(other.to_string()),
        }
    }

    /// The table the entity is addressed by.
    pub fn table_name(&self) -> &str {
        match self {
            Self::Book => "livre",
            Self::Dvd => "dvd",
            Self::Periodical => "revue",
            Self::Copy => "exemplaire",
            Self::Order => "commande",
            Self::DocumentOrder => "commandedocument",
            Self::Subscription => "abonnement",
            Self::Lookup(table) => table.table(),
            Self::User => "utilisateur",
            Self::Table(name) => name,
        }
    }
}
