//! Cost reference tables: locations, transport, allowances, consumables.
//!
//! Create and list only. List results are views carrying the display label of
//! every coded field and the names of referenced locations.

use chrono::Utc;

use strata_core::drafts::{
    NewAccommodation, NewAirTransport, NewLandTransport, NewLocation, NewParticipantCost,
    NewPerDiem, NewPrintingCost, NewProcurementItem, NewSessionCost, NewSupervisorCost,
};
use strata_core::entities::{
    Accommodation, AirTransport, LandTransport, Location, ParticipantCost, PerDiem, PrintingCost,
    ProcurementItem, SessionCost, SupervisorCost,
};
use strata_core::ids::{
    PREFIX_ACCOMMODATION, PREFIX_AIR_TRANSPORT, PREFIX_LAND_TRANSPORT, PREFIX_LOCATION,
    PREFIX_PARTICIPANT_COST, PREFIX_PER_DIEM, PREFIX_PRINTING_COST, PREFIX_PROCUREMENT_ITEM,
    PREFIX_SESSION_COST, PREFIX_SUPERVISOR_COST,
};
use strata_core::responses::{
    AccommodationView, AirTransportView, LandTransportView, ParticipantCostView, PerDiemView,
    PrintingCostView, ProcurementItemView, SessionCostView, SupervisorCostView,
};
use strata_core::validation::{RuleViolation, ValidationErrors};

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime, parse_enum};
use crate::service::{StrataService, ensure_valid, reject};

fn non_negative(errors: &mut ValidationErrors, field: &str, value: f64) {
    if value < 0.0 {
        errors.add(field, format!("{field} cannot be negative"));
    } else if !value.is_finite() {
        errors.add(field, format!("{field} must be a finite number"));
    }
}

fn check_amount(field: &str, value: f64) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    non_negative(&mut errors, field, value);
    errors
}

fn row_to_location(row: &libsql::Row) -> Result<Location, DatabaseError> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        region: get_opt_string(row, 2)?,
        is_hardship_area: get_bool(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Tables holding one coded type and one amount.
macro_rules! coded_cost_table {
    (
        $create:ident, $list:ident, $draft:ty => $entity:ident, $view:ty,
        $table:literal, $prefix:expr, $code:ident, $amount:ident
    ) => {
        impl StrataService {
            pub async fn $create(&self, draft: $draft) -> Result<$entity, DatabaseError> {
                ensure_valid($table, check_amount(stringify!($amount), draft.$amount))?;

                let now = Utc::now();
                let entry = $entity {
                    id: self.db().generate_id($prefix).await?,
                    $code: draft.$code,
                    $amount: draft.$amount,
                    created_at: now,
                    updated_at: now,
                };
                self.db().conn().execute(
                    concat!(
                        "INSERT INTO ", $table, " (id, ", stringify!($code), ", ", stringify!($amount),
                        ", created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    libsql::params![
                        entry.id.as_str(),
                        entry.$code.as_str(),
                        entry.$amount,
                        now.to_rfc3339(),
                        now.to_rfc3339()
                    ],
                ).await?;
                tracing::debug!(table = $table, id = %entry.id, "created cost entry");

                Ok(entry)
            }

            pub async fn $list(&self) -> Result<Vec<$view>, DatabaseError> {
                let mut rows = self.db().conn().query(
                    &format!(
                        concat!(
                            "SELECT id, ", stringify!($code), ", ", stringify!($amount),
                            ", created_at, updated_at FROM ", $table, " ORDER BY created_at, id LIMIT {}"
                        ),
                        self.default_limit()
                    ),
                    (),
                ).await?;

                let mut views = Vec::new();
                while let Some(row) = rows.next().await? {
                    let entry = $entity {
                        id: row.get(0)?,
                        $code: parse_enum(&row.get::<String>(1)?)?,
                        $amount: row.get(2)?,
                        created_at: parse_datetime(&row.get::<String>(3)?)?,
                        updated_at: parse_datetime(&row.get::<String>(4)?)?,
                    };
                    views.push(<$view>::from(entry));
                }
                Ok(views)
            }
        }
    };
}

coded_cost_table!(
    create_participant_cost, list_participant_costs, NewParticipantCost => ParticipantCost,
    ParticipantCostView, "participant_costs", PREFIX_PARTICIPANT_COST, cost_type, price
);
coded_cost_table!(
    create_session_cost, list_session_costs, NewSessionCost => SessionCost,
    SessionCostView, "session_costs", PREFIX_SESSION_COST, cost_type, price
);
coded_cost_table!(
    create_printing_cost, list_printing_costs, NewPrintingCost => PrintingCost,
    PrintingCostView, "printing_costs", PREFIX_PRINTING_COST, document_type, price_per_page
);
coded_cost_table!(
    create_supervisor_cost, list_supervisor_costs, NewSupervisorCost => SupervisorCost,
    SupervisorCostView, "supervisor_costs", PREFIX_SUPERVISOR_COST, cost_type, amount
);

impl StrataService {
    pub async fn create_location(&self, draft: NewLocation) -> Result<Location, DatabaseError> {
        if draft.name.trim().is_empty() {
            return Err(reject("location", RuleViolation::Blank { field: "name" }.into()));
        }

        let now = Utc::now();
        let location = Location {
            id: self.db().generate_id(PREFIX_LOCATION).await?,
            name: draft.name,
            region: draft.region,
            is_hardship_area: draft.is_hardship_area,
            created_at: now,
            updated_at: now,
        };
        self.db().conn().execute(
            "INSERT INTO locations (id, name, region, is_hardship_area, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                location.id.as_str(),
                location.name.as_str(),
                location.region.as_deref(),
                i64::from(location.is_hardship_area),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(location_id = %location.id, "created location");

        Ok(location)
    }

    pub async fn get_location(&self, id: &str) -> Result<Location, DatabaseError> {
        let mut rows = self.db().conn().query(
            "SELECT id, name, region, is_hardship_area, created_at, updated_at FROM locations WHERE id = ?1",
            [id],
        ).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("location", id))?;
        row_to_location(&row)
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT id, name, region, is_hardship_area, created_at, updated_at FROM locations \
                 ORDER BY name, id LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut locations = Vec::new();
        while let Some(row) = rows.next().await? {
            locations.push(row_to_location(&row)?);
        }
        Ok(locations)
    }

    async fn location_name(&self, id: &str) -> Result<String, DatabaseError> {
        Ok(self.get_location(id).await?.name)
    }

    pub async fn create_land_transport(
        &self,
        draft: NewLandTransport,
    ) -> Result<LandTransport, DatabaseError> {
        ensure_valid("land transport", check_amount("price", draft.price))?;
        self.get_location(&draft.origin_id).await?;
        self.get_location(&draft.destination_id).await?;

        let now = Utc::now();
        let entry = LandTransport {
            id: self.db().generate_id(PREFIX_LAND_TRANSPORT).await?,
            origin_id: draft.origin_id,
            destination_id: draft.destination_id,
            trip_type: draft.trip_type,
            price: draft.price,
            created_at: now,
            updated_at: now,
        };
        self.db().conn().execute(
            "INSERT INTO land_transports (id, origin_id, destination_id, trip_type, price, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                entry.id.as_str(),
                entry.origin_id.as_str(),
                entry.destination_id.as_str(),
                entry.trip_type.as_str(),
                entry.price,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(table = "land_transports", id = %entry.id, "created cost entry");

        Ok(entry)
    }

    pub async fn list_land_transports(&self) -> Result<Vec<LandTransportView>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT id, origin_id, destination_id, trip_type, price, created_at, updated_at \
                 FROM land_transports ORDER BY created_at, id LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(LandTransport {
                id: row.get(0)?,
                origin_id: row.get(1)?,
                destination_id: row.get(2)?,
                trip_type: parse_enum(&row.get::<String>(3)?)?,
                price: row.get(4)?,
                created_at: parse_datetime(&row.get::<String>(5)?)?,
                updated_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }

        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            views.push(LandTransportView {
                origin_name: self.location_name(&entry.origin_id).await?,
                destination_name: self.location_name(&entry.destination_id).await?,
                trip_type_label: entry.trip_type.label().to_string(),
                entry,
            });
        }
        Ok(views)
    }

    pub async fn create_air_transport(
        &self,
        draft: NewAirTransport,
    ) -> Result<AirTransport, DatabaseError> {
        ensure_valid("air transport", check_amount("price", draft.price))?;
        self.get_location(&draft.origin_id).await?;
        self.get_location(&draft.destination_id).await?;

        let now = Utc::now();
        let entry = AirTransport {
            id: self.db().generate_id(PREFIX_AIR_TRANSPORT).await?,
            origin_id: draft.origin_id,
            destination_id: draft.destination_id,
            price: draft.price,
            created_at: now,
            updated_at: now,
        };
        self.db().conn().execute(
            "INSERT INTO air_transports (id, origin_id, destination_id, price, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                entry.id.as_str(),
                entry.origin_id.as_str(),
                entry.destination_id.as_str(),
                entry.price,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(table = "air_transports", id = %entry.id, "created cost entry");

        Ok(entry)
    }

    pub async fn list_air_transports(&self) -> Result<Vec<AirTransportView>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT id, origin_id, destination_id, price, created_at, updated_at \
                 FROM air_transports ORDER BY created_at, id LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(AirTransport {
                id: row.get(0)?,
                origin_id: row.get(1)?,
                destination_id: row.get(2)?,
                price: row.get(3)?,
                created_at: parse_datetime(&row.get::<String>(4)?)?,
                updated_at: parse_datetime(&row.get::<String>(5)?)?,
            });
        }

        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            views.push(AirTransportView {
                origin_name: self.location_name(&entry.origin_id).await?,
                destination_name: self.location_name(&entry.destination_id).await?,
                entry,
            });
        }
        Ok(views)
    }

    pub async fn create_per_diem(&self, draft: NewPerDiem) -> Result<PerDiem, DatabaseError> {
        let mut errors = check_amount("amount", draft.amount);
        non_negative(&mut errors, "hardship_allowance_amount", draft.hardship_allowance_amount);
        ensure_valid("per diem", errors)?;
        self.get_location(&draft.location_id).await?;

        let now = Utc::now();
        let entry = PerDiem {
            id: self.db().generate_id(PREFIX_PER_DIEM).await?,
            location_id: draft.location_id,
            amount: draft.amount,
            hardship_allowance_amount: draft.hardship_allowance_amount,
            created_at: now,
            updated_at: now,
        };
        self.db().conn().execute(
            "INSERT INTO per_diems (id, location_id, amount, hardship_allowance_amount, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                entry.id.as_str(),
                entry.location_id.as_str(),
                entry.amount,
                entry.hardship_allowance_amount,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(table = "per_diems", id = %entry.id, "created cost entry");

        Ok(entry)
    }

    pub async fn list_per_diems(&self) -> Result<Vec<PerDiemView>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT id, location_id, amount, hardship_allowance_amount, created_at, updated_at \
                 FROM per_diems ORDER BY created_at, id LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(PerDiem {
                id: row.get(0)?,
                location_id: row.get(1)?,
                amount: row.get(2)?,
                hardship_allowance_amount: row.get(3)?,
                created_at: parse_datetime(&row.get::<String>(4)?)?,
                updated_at: parse_datetime(&row.get::<String>(5)?)?,
            });
        }

        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            views.push(PerDiemView {
                location_name: self.location_name(&entry.location_id).await?,
                entry,
            });
        }
        Ok(views)
    }

    pub async fn create_accommodation(
        &self,
        draft: NewAccommodation,
    ) -> Result<Accommodation, DatabaseError> {
        ensure_valid("accommodation", check_amount("price", draft.price))?;
        self.get_location(&draft.location_id).await?;

        let now = Utc::now();
        let entry = Accommodation {
            id: self.db().generate_id(PREFIX_ACCOMMODATION).await?,
            location_id: draft.location_id,
            service_type: draft.service_type,
            price: draft.price,
            created_at: now,
            updated_at: now,
        };
        self.db().conn().execute(
            "INSERT INTO accommodations (id, location_id, service_type, price, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                entry.id.as_str(),
                entry.location_id.as_str(),
                entry.service_type.as_str(),
                entry.price,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(table = "accommodations", id = %entry.id, "created cost entry");

        Ok(entry)
    }

    pub async fn list_accommodations(&self) -> Result<Vec<AccommodationView>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT id, location_id, service_type, price, created_at, updated_at \
                 FROM accommodations ORDER BY created_at, id LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Accommodation {
                id: row.get(0)?,
                location_id: row.get(1)?,
                service_type: parse_enum(&row.get::<String>(2)?)?,
                price: row.get(3)?,
                created_at: parse_datetime(&row.get::<String>(4)?)?,
                updated_at: parse_datetime(&row.get::<String>(5)?)?,
            });
        }

        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            views.push(AccommodationView {
                location_name: self.location_name(&entry.location_id).await?,
                service_type_label: entry.service_type.label().to_string(),
                entry,
            });
        }
        Ok(views)
    }

    pub async fn create_procurement_item(
        &self,
        draft: NewProcurementItem,
    ) -> Result<ProcurementItem, DatabaseError> {
        let mut errors = check_amount("unit_price", draft.unit_price);
        if draft.name.trim().is_empty() {
            errors.push(&RuleViolation::Blank { field: "name" });
        }
        ensure_valid("procurement item", errors)?;

        let now = Utc::now();
        let entry = ProcurementItem {
            id: self.db().generate_id(PREFIX_PROCUREMENT_ITEM).await?,
            category: draft.category,
            name: draft.name,
            unit: draft.unit,
            unit_price: draft.unit_price,
            created_at: now,
            updated_at: now,
        };
        self.db().conn().execute(
            "INSERT INTO procurement_items (id, category, name, unit, unit_price, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                entry.id.as_str(),
                entry.category.as_str(),
                entry.name.as_str(),
                entry.unit.as_str(),
                entry.unit_price,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        ).await?;
        tracing::debug!(table = "procurement_items", id = %entry.id, "created cost entry");

        Ok(entry)
    }

    pub async fn list_procurement_items(&self) -> Result<Vec<ProcurementItemView>, DatabaseError> {
        let mut rows = self.db().conn().query(
            &format!(
                "SELECT id, category, name, unit, unit_price, created_at, updated_at \
                 FROM procurement_items ORDER BY category, name, id LIMIT {}",
                self.default_limit()
            ),
            (),
        ).await?;

        let mut views = Vec::new();
        while let Some(row) = rows.next().await? {
            views.push(ProcurementItemView::from(ProcurementItem {
                id: row.get(0)?,
                category: parse_enum(&row.get::<String>(1)?)?,
                name: row.get(2)?,
                unit: parse_enum(&row.get::<String>(3)?)?,
                unit_price: row.get(4)?,
                created_at: parse_datetime(&row.get::<String>(5)?)?,
                updated_at: parse_datetime(&row.get::<String>(6)?)?,
            }));
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use strata_core::enums::{
        AccommodationService, ParticipantCostType, PrintingDocumentType, TripType,
    };

    async fn location(svc: &StrataService, name: &str, hardship: bool) -> Location {
        svc.create_location(NewLocation {
            name: name.into(),
            region: Some("Afar".into()),
            is_hardship_area: hardship,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn land_transport_view_names_both_ends() {
        let svc = test_service().await;
        let semera = location(&svc, "Semera", true).await;
        let addis = location(&svc, "Addis Ababa", false).await;

        svc.create_land_transport(NewLandTransport {
            origin_id: addis.id.clone(),
            destination_id: semera.id.clone(),
            trip_type: TripType::RoundTrip,
            price: 2400.0,
        })
        .await
        .unwrap();

        let views = svc.list_land_transports().await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].origin_name, "Addis Ababa");
        assert_eq!(views[0].destination_name, "Semera");
        assert_eq!(views[0].trip_type_label, "Round Trip");
    }

    #[tokio::test]
    async fn accommodation_and_per_diem_resolve_location() {
        let svc = test_service().await;
        let semera = location(&svc, "Semera", true).await;

        svc.create_accommodation(NewAccommodation {
            location_id: semera.id.clone(),
            service_type: AccommodationService::HallRefreshment,
            price: 350.0,
        })
        .await
        .unwrap();
        svc.create_per_diem(NewPerDiem {
            location_id: semera.id.clone(),
            amount: 600.0,
            hardship_allowance_amount: 150.0,
        })
        .await
        .unwrap();

        let stays = svc.list_accommodations().await.unwrap();
        assert_eq!(stays[0].service_type_label, "Hall with Refreshment");
        assert_eq!(stays[0].location_name, "Semera");
        assert_eq!(svc.list_per_diems().await.unwrap()[0].location_name, "Semera");
        assert!(svc.get_location(&semera.id).await.unwrap().is_hardship_area);
    }

    #[tokio::test]
    async fn coded_tables_carry_labels() {
        let svc = test_service().await;
        svc.create_participant_cost(NewParticipantCost {
            cost_type: ParticipantCostType::FlashDisk,
            price: 250.0,
        })
        .await
        .unwrap();
        svc.create_printing_cost(NewPrintingCost {
            document_type: PrintingDocumentType::Booklet,
            price_per_page: 3.5,
        })
        .await
        .unwrap();

        assert_eq!(svc.list_participant_costs().await.unwrap()[0].cost_type_label, "Flash Disk");
        assert_eq!(svc.list_printing_costs().await.unwrap()[0].document_type_label, "Booklet");
        assert!(svc.list_session_costs().await.unwrap().is_empty());
        assert!(svc.list_supervisor_costs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_participant_cost(NewParticipantCost {
                cost_type: ParticipantCostType::All,
                price: -1.0,
            })
            .await
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains_field("price"));
    }

    #[tokio::test]
    async fn nan_amount_is_rejected() {
        let svc = test_service().await;
        let semera = location(&svc, "Semera", true).await;
        let err = svc
            .create_per_diem(NewPerDiem {
                location_id: semera.id,
                amount: f64::NAN,
                hardship_allowance_amount: 0.0,
            })
            .await
            .unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.get("amount").unwrap()[0], "amount must be a finite number");
        assert!(svc.list_per_diems().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_to_unknown_location_is_not_found() {
        let svc = test_service().await;
        let addis = location(&svc, "Addis Ababa", false).await;
        let err = svc
            .create_air_transport(NewAirTransport {
                origin_id: addis.id,
                destination_id: "loc-missing".into(),
                price: 5000.0,
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
