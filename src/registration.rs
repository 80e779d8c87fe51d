//! Self-service registration and admin-side registrant operations

use chrono::Utc;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::phone;
use crate::ratelimit::RateLimiter;
use crate::store::{Interest, NewRegistrant, Registrant, RegistrantFilter, RegistrantStore};

/// A self-service registration submission.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub college: Option<String>,
    pub phone: String,
    pub interest: Interest,
}

/// Register a single student as unassigned.
///
/// Rate-limited per phone number, validates the Egyptian mobile format,
/// sanitizes free-text fields, and maps duplicate phones to
/// `AlreadyRegistered` (both via pre-check and via the store's conflict
/// error, since the pre-check can race).
pub async fn register_student<S>(
    store: &S,
    limiter: &RateLimiter,
    request: RegistrationRequest,
) -> Result<Registrant>
where
    S: RegistrantStore + ?Sized,
{
    if !limiter.check(&request.phone) {
        return Err(Error::RateLimited);
    }
    if !phone::is_valid_egyptian_phone(&request.phone) {
        return Err(Error::Validation(
            "Invalid Egyptian phone number format".into(),
        ));
    }

    let phone_number = phone::sanitize(&request.phone);
    let existing = store
        .query_registrants(&RegistrantFilter::by_phone(&phone_number))
        .await?;
    if !existing.is_empty() {
        return Err(Error::AlreadyRegistered {
            phone: phone_number,
        });
    }

    let fields = NewRegistrant {
        name: phone::sanitize(&request.name),
        college: request
            .college
            .as_deref()
            .map(phone::sanitize)
            .filter(|c| !c.is_empty()),
        phone: phone_number.clone(),
        interest: request.interest,
        assigned: false,
        group_id: None,
        is_dummy: false,
        created_at: Utc::now(),
    };

    match store.insert_registrant(fields).await {
        Ok(registrant) => {
            info!(phone = %registrant.phone, "student registered");
            Ok(registrant)
        }
        Err(err) if err.is_conflict() => Err(Error::AlreadyRegistered {
            phone: phone_number,
        }),
        Err(err) => {
            error!(%err, "registration insert failed");
            Err(Error::Registration("فشل التسجيل. حاول مرة أخرى.".into()))
        }
    }
}

/// All registrants, newest first.
pub async fn list_registrants<S>(store: &S) -> Result<Vec<Registrant>>
where
    S: RegistrantStore + ?Sized,
{
    Ok(store.query_registrants(&RegistrantFilter::all()).await?)
}

/// Total registrant count, real and synthetic. Read failures degrade to zero
/// after logging; the count only feeds a public display.
pub async fn registration_count<S>(store: &S) -> u64
where
    S: RegistrantStore + ?Sized,
{
    match store.count_registrants().await {
        Ok(count) => count,
        Err(err) => {
            error!(%err, "failed to fetch registration count");
            0
        }
    }
}

const ARABIC_FIRST_NAMES: &[&str] = &[
    "أحمد", "محمد", "علي", "حسن", "خالد", "عمر", "يوسف", "كريم", "طارق", "مصطفى",
    "فاطمة", "سارة", "نور", "ياسمين", "مريم", "دينا", "رنا", "لينا", "هدى", "سلمى",
];

const ARABIC_LAST_NAMES: &[&str] = &[
    "محمود", "إبراهيم", "عبدالله", "حسين", "صلاح", "ناصر", "فاروق", "سعيد", "رشاد", "جمال",
    "أحمد", "علي", "حسن", "خليل", "منصور", "عادل", "وليد", "حمدي", "ماهر", "نبيل",
];

const ENGLISH_FIRST_NAMES: &[&str] = &[
    "Ahmed", "Mohamed", "Ali", "Hassan", "Khaled", "Omar", "Youssef", "Karim", "Tarek",
    "Mostafa", "Fatma", "Sarah", "Nour", "Yasmin", "Mariam", "Dina", "Rana", "Lina", "Hoda",
    "Salma", "Mahmoud", "Amr", "Hossam", "Tamer", "Sherif", "Adel", "Fady", "Hany", "Ramy",
    "Wael", "Aya", "Eman", "Heba", "Laila", "Mona", "Noha", "Reem", "Samar", "Yara", "Zainab",
];

const ENGLISH_LAST_NAMES: &[&str] = &[
    "Mahmoud", "Ibrahim", "Abdullah", "Hussein", "Salah", "Nasser", "Farouk", "Said",
    "Rashad", "Gamal", "Ahmed", "Ali", "Hassan", "Khalil", "Mansour", "Adel", "Walid",
    "Hamdy", "Maher", "Nabil", "Youssef", "Mostafa", "Sayed", "Fathy", "Shawky", "Sabry",
    "Gomaa", "Ashraf", "Ezzat", "Kamel", "Hamed", "Bakr", "Othman", "Zaki", "Helmy",
    "Ramadan", "Shahin", "Hegazy",
];

const COLLEGES: &[&str] = &[
    "كلية الهندسة",
    "كلية الحاسبات والمعلومات",
    "كلية التجارة",
    "كلية الاقتصاد",
    "كلية الإعلام",
    "كلية الفنون",
    "كلية العلوم",
    "كلية الطب",
    "كلية الصيدلة",
    "كلية الآداب",
];

const PHONE_PREFIXES: &[&str] = &[
    "0100", "0101", "0102", "0105", "0106", "0109", "0111", "0112", "0115", "0120",
];

fn random_synthetic_phone(rng: &mut impl Rng) -> String {
    let prefix = PHONE_PREFIXES.choose(rng).copied().unwrap_or("0100");
    let rest: u32 = rng.random_range(0..10_000_000);
    format!("+2{prefix}{rest:07}")
}

/// Create one synthetic test registrant with randomized Arabic or English
/// name, college, interest and phone. Retries up to five times on a phone
/// collision with a freshly generated number.
pub async fn add_synthetic_registrant<S>(store: &S) -> Result<Registrant>
where
    S: RegistrantStore + ?Sized,
{
    let mut rng = rand::rng();
    let (first_names, last_names) = if rng.random_bool(0.5) {
        (ARABIC_FIRST_NAMES, ARABIC_LAST_NAMES)
    } else {
        (ENGLISH_FIRST_NAMES, ENGLISH_LAST_NAMES)
    };
    let name = format!(
        "{} {}",
        first_names.choose(&mut rng).copied().unwrap_or("Ahmed"),
        last_names.choose(&mut rng).copied().unwrap_or("Mahmoud"),
    );
    let college = COLLEGES.choose(&mut rng).copied().map(String::from);
    let interest = Interest::ALL
        .choose(&mut rng)
        .copied()
        .unwrap_or(Interest::Other);

    let mut phone_number = random_synthetic_phone(&mut rng);
    for attempt in 0..5 {
        let fields = NewRegistrant {
            name: name.clone(),
            college: college.clone(),
            phone: phone_number.clone(),
            interest,
            assigned: false,
            group_id: None,
            is_dummy: true,
            created_at: Utc::now(),
        };
        match store.insert_registrant(fields).await {
            Ok(registrant) => return Ok(registrant),
            Err(err) if err.is_conflict() => {
                warn!(phone = %phone_number, attempt, "synthetic phone collided, regenerating");
                phone_number = random_synthetic_phone(&mut rng);
            }
            Err(err) => {
                warn!(%err, attempt, "synthetic registrant insert failed");
            }
        }
    }
    Err(Error::Registration(
        "Failed to add random student after multiple attempts".into(),
    ))
}
