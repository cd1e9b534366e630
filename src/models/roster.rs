use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display records for the people and vehicles bookings reference.
/// Presentation-only: view search and day-view columns read these, the
/// scheduling invariants never do, so a stale roster is harmless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub registration: String,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: HashMap<Uuid, Student>,
    instructors: HashMap<Uuid, Instructor>,
    vehicles: HashMap<Uuid, Vehicle>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_student(&mut self, student: Student) {
        self.students.insert(student.id, student);
    }

    pub fn add_instructor(&mut self, instructor: Instructor) {
        self.instructors.insert(instructor.id, instructor);
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.insert(vehicle.id, vehicle);
    }

    pub fn student_name(&self, id: Uuid) -> Option<&str> {
        self.students.get(&id).map(|s| s.name.as_str())
    }

    pub fn instructor_name(&self, id: Uuid) -> Option<&str> {
        self.instructors.get(&id).map(|i| i.name.as_str())
    }

    pub fn vehicle_registration(&self, id: Uuid) -> Option<&str> {
        self.vehicles.get(&id).map(|v| v.registration.as_str())
    }

    /// Active instructors sorted by name, the day-view column order.
    pub fn active_instructors(&self) -> Vec<&Instructor> {
        let mut active: Vec<&Instructor> =
            self.instructors.values().filter(|i| i.active).collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        active
    }
}
