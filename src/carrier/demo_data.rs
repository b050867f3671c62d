//! Static lookup tables served in demo mode.

use serde::Serialize;

pub const COUNTRY_CODE: &str = "RU";
pub const COUNTRY: &str = "Россия";

#[derive(Debug, Clone, Copy)]
pub struct City {
    pub code: u32,
    pub city: &'static str,
    pub region: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityRecord {
    pub code: u32,
    pub city: &'static str,
    pub region: &'static str,
    pub country_code: &'static str,
    pub country: &'static str,
}

impl City {
    pub fn record(&self) -> CityRecord {
        CityRecord {
            code: self.code,
            city: self.city,
            region: self.region,
            country_code: COUNTRY_CODE,
            country: COUNTRY,
        }
    }

    /// Case-insensitive substring match on city or region name.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.city.to_lowercase().contains(needle_lowercase)
            || self.region.to_lowercase().contains(needle_lowercase)
    }
}

pub const CITIES: &[City] = &[
    City { code: 44, city: "Москва", region: "Московская область" },
    City { code: 137, city: "Санкт-Петербург", region: "Ленинградская область" },
    City { code: 151, city: "Казань", region: "Татарстан" },
    City { code: 54, city: "Новосибирск", region: "Новосибирская область" },
    City { code: 77, city: "Екатеринбург", region: "Свердловская область" },
    City { code: 56, city: "Ростов-на-Дону", region: "Ростовская область" },
    City { code: 250, city: "Тула", region: "Тульская область" },
    City { code: 243, city: "Калуга", region: "Калужская область" },
    City { code: 435, city: "Рязань", region: "Рязанская область" },
    City { code: 426, city: "Смоленск", region: "Смоленская область" },
    City { code: 442, city: "Самара", region: "Самарская область" },
    City { code: 470, city: "Уфа", region: "Башкортостан" },
    City { code: 185, city: "Пермь", region: "Пермский край" },
    City { code: 434, city: "Саратов", region: "Саратовская область" },
    City { code: 142, city: "Омск", region: "Омская область" },
    City { code: 227, city: "Красноярск", region: "Красноярский край" },
    City { code: 66, city: "Иркутск", region: "Иркутская область" },
    City { code: 398, city: "Краснодар", region: "Краснодарский край" },
    City { code: 205, city: "Волгоград", region: "Волгоградская область" },
    City { code: 357, city: "Ставрополь", region: "Ставропольский край" },
    City { code: 159, city: "Мурманск", region: "Мурманская область" },
    City { code: 31, city: "Архангельск", region: "Архангельская область" },
    City { code: 173, city: "Челябинск", region: "Челябинская область" },
    City { code: 126, city: "Тюмень", region: "Тюменская область" },
    City { code: 104, city: "Владивосток", region: "Приморский край" },
    City { code: 113, city: "Хабаровск", region: "Хабаровский край" },
    City { code: 385, city: "Якутск", region: "Саха (Якутия)" },
    City { code: 51, city: "Нижний Новгород", region: "Нижегородская область" },
    City { code: 295, city: "Воронеж", region: "Воронежская область" },
    City { code: 69, city: "Кемерово", region: "Кемеровская область" },
    City { code: 76, city: "Томск", region: "Томская область" },
    City { code: 135, city: "Барнаул", region: "Алтайский край" },
    City { code: 369, city: "Ульяновск", region: "Ульяновская область" },
    City { code: 287, city: "Орёл", region: "Орловская область" },
    City { code: 271, city: "Липецк", region: "Липецкая область" },
    City { code: 326, city: "Белгород", region: "Белгородская область" },
    City { code: 304, city: "Курск", region: "Курская область" },
    City { code: 313, city: "Брянск", region: "Брянская область" },
    City { code: 341, city: "Владимир", region: "Владимирская область" },
    City { code: 362, city: "Иваново", region: "Ивановская область" },
    City { code: 425, city: "Кострома", region: "Костромская область" },
    City { code: 438, city: "Ярославль", region: "Ярославская область" },
    City { code: 456, city: "Тверь", region: "Тверская область" },
    City { code: 445, city: "Вологда", region: "Вологодская область" },
    City { code: 179, city: "Псков", region: "Псковская область" },
    City { code: 166, city: "Великий Новгород", region: "Новгородская область" },
    City { code: 190, city: "Петрозаводск", region: "Карелия" },
    City { code: 96, city: "Сыктывкар", region: "Коми" },
    City { code: 218, city: "Магадан", region: "Магаданская область" },
    City { code: 197, city: "Южно-Сахалинск", region: "Сахалинская область" },
    City { code: 212, city: "Петропавловск-Камчатский", region: "Камчатский край" },
    City { code: 399, city: "Сочи", region: "Краснодарский край" },
    City { code: 416, city: "Анапа", region: "Краснодарский край" },
    City { code: 420, city: "Геленджик", region: "Краснодарский край" },
    City { code: 403, city: "Новороссийск", region: "Краснодарский край" },
];

/// Cities served by the paginated listing, grouped by federal district.
pub const LISTED_CITY_CODES: &[u32] = &[
    44, 250, 243, 435, 426, 137,
    151, 442, 470, 185, 434,
    54, 77, 142, 227, 66,
    56, 398, 205, 357,
    159, 31,
    173, 126,
    104, 113, 385,
];

pub fn listed_cities() -> Vec<City> {
    LISTED_CITY_CODES
        .iter()
        .filter_map(|code| CITIES.iter().find(|city| city.code == *code).copied())
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct PickupPoint {
    pub code: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub city_code: u32,
    pub city: &'static str,
    pub work_time: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupPointLocation {
    pub address: String,
    pub city_code: u32,
    pub city: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupPointRecord {
    pub code: String,
    pub name: String,
    pub location: PickupPointLocation,
    pub work_time: String,
    #[serde(rename = "type")]
    pub point_type: &'static str,
    pub is_handout: bool,
    pub is_reception: bool,
}

impl PickupPoint {
    pub fn record(&self) -> PickupPointRecord {
        PickupPointRecord {
            code: self.code.to_owned(),
            name: self.name.to_owned(),
            location: PickupPointLocation {
                address: self.address.to_owned(),
                city_code: self.city_code,
                city: self.city.to_owned(),
            },
            work_time: self.work_time.to_owned(),
            point_type: "PVZ",
            is_handout: true,
            is_reception: true,
        }
    }
}

pub const PICKUP_POINTS: &[PickupPoint] = &[
    PickupPoint { code: "PVZ001", name: "Пункт выдачи СДЭК #1", address: "ул. Тверская, д. 10, стр. 1", city_code: 44, city: "Москва", work_time: "Пн-Пт: 09:00-20:00, Сб-Вс: 10:00-18:00" },
    PickupPoint { code: "PVZ002", name: "Пункт выдачи СДЭК #2", address: "пр. Мира, д. 45, офис 12", city_code: 44, city: "Москва", work_time: "Ежедневно: 10:00-22:00" },
    PickupPoint { code: "PVZ101", name: "Пункт выдачи СДЭК СПб #1", address: "Невский пр., д. 28", city_code: 137, city: "Санкт-Петербург", work_time: "Пн-Вс: 09:00-21:00" },
    PickupPoint { code: "PVZ151", name: "Пункт выдачи СДЭК Казань", address: "ул. Баумана, д. 15", city_code: 151, city: "Казань", work_time: "Пн-Пт: 10:00-19:00, Сб: 10:00-16:00" },
    PickupPoint { code: "PVZ054", name: "Пункт выдачи СДЭК Новосибирск", address: "Красный проспект, д. 32", city_code: 54, city: "Новосибирск", work_time: "Пн-Пт: 09:00-20:00" },
    PickupPoint { code: "PVZ077", name: "Пункт выдачи СДЭК Екатеринбург", address: "ул. Ленина, д. 50", city_code: 77, city: "Екатеринбург", work_time: "Пн-Вс: 08:00-20:00" },
];

/// Single generic point for codes without a dedicated entry.
pub fn fallback_pickup_point(city_code: u32) -> PickupPointRecord {
    PickupPoint {
        code: "PVZ999",
        name: "Пункт выдачи СДЭК",
        address: "ул. Центральная, д. 1",
        city_code,
        city: "Город",
        work_time: "Пн-Пт: 09:00-18:00",
    }
    .record()
}

// Flat-rate tariff
pub const TARIFF_CODE: u32 = 136;
pub const TARIFF_NAME: &str = "Посылка склад-склад";
pub const TARIFF_DESCRIPTION: &str = "Доставка до пункта выдачи забора";
pub const DELIVERY_MODE: u32 = 4;
pub const BASE_COST: u32 = 250;
/// added for every destination other than Moscow
pub const DISTANCE_SURCHARGE: u32 = 100;
pub const PERIOD_MIN_DAYS: u32 = 2;
pub const PERIOD_MAX_DAYS: u32 = 5;
pub const CURRENCY: &str = "RUB";

pub const STATUS_CREATED: &str = "CREATED";
pub const STATUS_CREATED_NAME: &str = "Заказ создан";
