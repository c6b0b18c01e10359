//! Static domain and local-part classification.
//!
//! Membership tests only: no I/O, no failure modes. The sets are built once
//! (from the built-in lists or the config file) and never mutated afterwards.

use std::collections::HashSet;

const MAJOR_PROVIDERS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "outlook.com",
    "hotmail.com",
    "live.com",
    "msn.com",
    "yahoo.com",
    "yahoo.co.uk",
    "yahoo.ca",
    "yahoo.au",
    "ymail.com",
    "rocketmail.com",
    "aol.com",
    "aim.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "protonmail.com",
    "proton.me",
    "zoho.com",
    "zohomail.com",
    "yandex.com",
    "yandex.ru",
    "mail.ru",
    "inbox.ru",
    "list.ru",
    "bk.ru",
    "gmx.com",
    "gmx.net",
    "gmx.de",
    "web.de",
    "t-online.de",
    "comcast.net",
    "verizon.net",
    "att.net",
    "bellsouth.net",
];

const OTHER_KNOWN_DOMAINS: &[&str] = &[
    "company.com",
    "business.com",
    "enterprise.com",
    "corp.com",
    "inc.com",
    "apple.com",
    "microsoft.com",
    "amazon.com",
    "facebook.com",
    "twitter.com",
];

const DISPOSABLE_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "tempmail.org",
    "throwaway.email",
    "yopmail.com",
    "temp-mail.org",
    "fakeinbox.com",
    "maildrop.cc",
    "tempail.com",
    "dispostable.com",
    "0-mail.com",
    "mytemp.email",
    "temp-mail.io",
    "mail-temp.com",
    "tempinbox.com",
    "spamgourmet.com",
    "mailnull.com",
    "suremail.info",
    "spamhole.com",
    "grr.la",
    "pokemail.net",
    "spam4.me",
    "koszmail.pl",
    "binkmail.com",
    "spambog.ru",
    "safersignup.de",
    "deadaddress.com",
    "kurzepost.de",
    "lifebyfood.com",
    "objectmail.com",
    "obobbo.com",
    "rcpt.at",
    "spamobox.com",
    "upliftnow.com",
    "uplipht.com",
    "venompen.com",
    "walkmail.net",
    "wetrainbayarea.com",
    "zetmail.com",
];

const SPAM_TRAP_DOMAINS: &[&str] = &[
    "spamtrap.com",
    "spamcop.net",
    "abuse.net",
    "uol.com.br",
    "blackhole.com",
    "devnull.com",
    "null.com",
];

const ROLE_PREFIXES: &[&str] = &[
    "admin",
    "administrator",
    "info",
    "contact",
    "support",
    "help",
    "sales",
    "marketing",
    "billing",
    "accounts",
    "finance",
    "hr",
    "humanresources",
    "jobs",
    "careers",
    "recruitment",
    "noreply",
    "no-reply",
    "donotreply",
    "do-not-reply",
    "newsletter",
    "news",
    "updates",
    "alerts",
    "notifications",
    "webmaster",
    "postmaster",
    "hostmaster",
    "root",
    "sysadmin",
    "abuse",
    "security",
    "privacy",
    "legal",
    "compliance",
    "feedback",
    "survey",
];

/// The lowercase lookup sets consulted by [`DomainClassifier`].
#[derive(Debug, Clone, Default)]
pub struct ClassificationSets {
    pub known_valid_major: HashSet<String>,
    pub known_valid_other: HashSet<String>,
    pub disposable: HashSet<String>,
    pub spam_trap: HashSet<String>,
    pub role_prefixes: HashSet<String>,
}

impl ClassificationSets {
    /// The lists shipped with the binary.
    pub fn builtin() -> Self {
        Self {
            known_valid_major: to_set(MAJOR_PROVIDERS),
            known_valid_other: to_set(OTHER_KNOWN_DOMAINS),
            disposable: to_set(DISPOSABLE_DOMAINS),
            spam_trap: to_set(SPAM_TRAP_DOMAINS),
            role_prefixes: to_set(ROLE_PREFIXES),
        }
    }

    /// Domains listed both in a rejecting set and a known-valid set.
    ///
    /// The classifier resolves these in favour of rejection; callers use this
    /// only to warn about a suspicious configuration.
    pub fn conflicting_domains(&self) -> Vec<String> {
        let mut conflicts: Vec<String> = self
            .disposable
            .iter()
            .chain(self.spam_trap.iter())
            .filter(|d| self.known_valid_major.contains(*d) || self.known_valid_other.contains(*d))
            .cloned()
            .collect();
        conflicts.sort();
        conflicts.dedup();
        conflicts
    }
}

/// Lowercases and trims each entry, dropping empty ones.
pub fn normalize_entries<I, S>(entries: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn to_set(items: &[&str]) -> HashSet<String> {
    normalize_entries(items.iter())
}

/// Classification of an address by its domain and local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainClass {
    Disposable,
    SpamTrap,
    KnownValidMajor,
    KnownValidOther,
    RoleBased,
    Unclassified,
}

#[derive(Debug, Clone)]
pub struct DomainClassifier {
    sets: ClassificationSets,
}

impl DomainClassifier {
    pub fn new(sets: ClassificationSets) -> Self {
        Self { sets }
    }

    /// Classifies an already-lowercased `domain` and `local_part`.
    ///
    /// Disposable and spam-trap membership win over known-valid membership.
    /// Role-based is only reported for domains in none of the domain sets.
    pub fn classify(&self, domain: &str, local_part: &str) -> DomainClass {
        if self.sets.disposable.contains(domain) {
            DomainClass::Disposable
        } else if self.sets.spam_trap.contains(domain) {
            DomainClass::SpamTrap
        } else if self.sets.known_valid_major.contains(domain) {
            DomainClass::KnownValidMajor
        } else if self.sets.known_valid_other.contains(domain) {
            DomainClass::KnownValidOther
        } else if self.sets.role_prefixes.contains(local_part) {
            DomainClass::RoleBased
        } else {
            DomainClass::Unclassified
        }
    }

    pub fn sets(&self) -> &ClassificationSets {
        &self.sets
    }
}

impl Default for DomainClassifier {
    fn default() -> Self {
        Self::new(ClassificationSets::builtin())
    }
}
