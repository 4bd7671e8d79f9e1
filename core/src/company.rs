//! The company side of the world: catalog, customers, orders, fleet, deliveries.
//!
//! RULE: Simulators mutate the company only through the append/complete
//! operations below. Each one leaves the aggregate consistent on return.

use crate::types::{EntityId, VirtualSeconds};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyKind {
    Domestic,
    International,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6_371.0;
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// Point `fraction` of the way from `self` to `to`. Linear, good enough for display.
    pub fn lerp(&self, to: &GeoPoint, fraction: f64) -> GeoPoint {
        let f = fraction.clamp(0.0, 1.0);
        GeoPoint {
            lat: self.lat + (to.lat - self.lat) * f,
            lon: self.lon + (to.lon - self.lon) * f,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street:   String,
    pub city:     String,
    pub region:   String,
    pub country:  String,
    pub zip_code: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductType {
    pub id:             EntityId,
    pub name:           String,
    pub origin_country: String,
    pub unit_price:     f64,
    pub unit_weight_kg: f64,
    pub fragile:        bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id:       EntityId,
    pub type_id:  EntityId,
    pub location: GeoPoint,
    pub price:    f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id:      EntityId,
    pub name:    String,
    pub email:   String,
    pub address: PostalAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Assigned,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id:          EntityId,
    pub customer_id: EntityId,
    pub product_ids: Vec<EntityId>,
    pub placed_at:   VirtualSeconds,
    pub status:      OrderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportationMode {
    LandRail,
    LandRoad,
    Water,
    Air,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transportation {
    pub id:          EntityId,
    pub capacity_kg: f64,
    pub speed_kmh:   f64,
    pub mode:        TransportationMode,
    pub available:   bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    InTransit,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id:                EntityId,
    pub order_id:          EntityId,
    pub transportation_id: EntityId,
    pub origin:            GeoPoint,
    pub destination:       GeoPoint,
    pub distance_km:       f64,
    pub travelled_km:      f64,
    pub position:          GeoPoint,
    pub status:            DeliveryStatus,
}

impl Delivery {
    pub fn progress(&self) -> f64 {
        if self.distance_km <= 0.0 {
            1.0
        } else {
            (self.travelled_km / self.distance_km).min(1.0)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub kind:         CompanyKind,
    pub name:         String,
    pub headquarters: PostalAddress,
    product_types:    Vec<ProductType>,
    products:         Vec<Product>,
    customers:        Vec<Customer>,
    orders:           Vec<Order>,
    deliveries:       Vec<Delivery>,
    transportation:   Vec<Transportation>,
}

impl Company {
    pub fn new(kind: CompanyKind, name: String, headquarters: PostalAddress) -> Self {
        Self {
            kind,
            name,
            headquarters,
            product_types:  Vec::new(),
            products:       Vec::new(),
            customers:      Vec::new(),
            orders:         Vec::new(),
            deliveries:     Vec::new(),
            transportation: Vec::new(),
        }
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn product_types(&self) -> &[ProductType] { &self.product_types }
    pub fn products(&self) -> &[Product] { &self.products }
    pub fn customers(&self) -> &[Customer] { &self.customers }
    pub fn orders(&self) -> &[Order] { &self.orders }
    pub fn deliveries(&self) -> &[Delivery] { &self.deliveries }
    pub fn transportation(&self) -> &[Transportation] { &self.transportation }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Orders not yet assigned to a delivery, in placement order.
    pub fn open_order_ids(&self) -> Vec<EntityId> {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Open)
            .map(|o| o.id.clone())
            .collect()
    }

    pub fn in_transit_delivery_ids(&self) -> Vec<EntityId> {
        self.deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::InTransit)
            .map(|d| d.id.clone())
            .collect()
    }

    /// First idle vehicle in fleet order.
    pub fn available_transportation(&self) -> Option<&Transportation> {
        self.transportation.iter().find(|t| t.available)
    }

    // ── Appends ────────────────────────────────────────────────

    pub fn add_product_type(&mut self, product_type: ProductType) {
        self.product_types.push(product_type);
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }

    pub fn add_transportation(&mut self, transportation: Transportation) {
        self.transportation.push(transportation);
    }

    pub fn new_customer(&mut self, customer: Customer) {
        self.customers.push(customer);
    }

    /// Appends an order. Returns false if the buyer is unknown.
    pub fn new_order(&mut self, order: Order) -> bool {
        if self.customer(&order.customer_id).is_none() {
            return false;
        }
        self.orders.push(order);
        true
    }

    /// Appends a delivery for an open order on an idle vehicle.
    /// The order becomes Assigned and the vehicle busy.
    /// Returns false, changing nothing, if either precondition fails.
    pub fn new_delivery(&mut self, delivery: Delivery) -> bool {
        let Some(order_idx) = self
            .orders
            .iter()
            .position(|o| o.id == delivery.order_id && o.status == OrderStatus::Open)
        else {
            return false;
        };
        let Some(vehicle_idx) = self
            .transportation
            .iter()
            .position(|t| t.id == delivery.transportation_id && t.available)
        else {
            return false;
        };
        self.orders[order_idx].status = OrderStatus::Assigned;
        self.transportation[vehicle_idx].available = false;
        self.deliveries.push(delivery);
        true
    }

    pub fn delivery_mut(&mut self, id: &str) -> Option<&mut Delivery> {
        self.deliveries.iter_mut().find(|d| d.id == id)
    }

    pub fn transportation_by_id(&self, id: &str) -> Option<&Transportation> {
        self.transportation.iter().find(|t| t.id == id)
    }

    /// Marks a delivery delivered, its order delivered, and frees the vehicle.
    pub fn complete_delivery(&mut self, delivery_id: &str) -> bool {
        let Some(delivery) = self
            .deliveries
            .iter_mut()
            .find(|d| d.id == delivery_id && d.status == DeliveryStatus::InTransit)
        else {
            return false;
        };
        delivery.status = DeliveryStatus::Delivered;
        delivery.travelled_km = delivery.distance_km;
        delivery.position = delivery.destination;
        let (order_id, vehicle_id) = (delivery.order_id.clone(), delivery.transportation_id.clone());

        if let Some(order) = self.orders.iter_mut().find(|o| o.id == order_id) {
            order.status = OrderStatus::Delivered;
        }
        if let Some(vehicle) = self.transportation.iter_mut().find(|t| t.id == vehicle_id) {
            vehicle.available = true;
        }
        true
    }
}
