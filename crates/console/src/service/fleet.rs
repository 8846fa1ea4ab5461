//! Distributor delivery fleet: drivers and trucks.

use pledge_auth::{authorize, authorize_in_filiale, Permission};
use pledge_core::{DomainError, Filter, LivreurId, TruckId, UserId};
use pledge_fleet::{Livreur, LivreurFilter, NewLivreur, NewTruck, Truck, TruckFilter};
use pledge_infra::EventStore;

use super::{guard, scope, today, unique, ConsoleService};
use crate::error::ServiceResult;

fn same_username(a: &Livreur, b: &Livreur) -> bool {
    a.username == b.username
}

impl<S: EventStore> ConsoleService<S> {
    /// Register a driver. Usernames are unique across the console.
    pub fn create_livreur(&self, caller: UserId, input: NewLivreur) -> ServiceResult<Livreur> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "create_livreur",
            authorize_in_filiale(&principal, &Permission::LIVREURS_MANAGE, input.filiale_id),
        )?;
        self.repos.filiales.get(input.filiale_id)?;

        let livreur = Livreur::new(LivreurId::new(), input, today())?;
        unique(self.repos.livreurs.insert_unique(livreur.clone(), &same_username), || {
            format!("username '{}' is already taken", livreur.username)
        })?;
        tracing::info!(livreur_id = %livreur.id, username = %livreur.username, "livreur created");
        Ok(livreur)
    }

    pub fn update_livreur(
        &self,
        caller: UserId,
        livreur_id: LivreurId,
        input: NewLivreur,
    ) -> ServiceResult<Livreur> {
        let principal = self.principal(caller)?;
        let mut livreur = self.repos.livreurs.get(livreur_id)?;
        guard(
            &principal,
            "update_livreur",
            authorize_in_filiale(&principal, &Permission::LIVREURS_MANAGE, livreur.filiale_id),
        )?;

        livreur.update(input)?;
        unique(self.repos.livreurs.update_unique(livreur.clone(), &same_username), || {
            format!("username '{}' is already taken", livreur.username)
        })?;
        tracing::info!(%livreur_id, active = livreur.is_active, "livreur updated");
        Ok(livreur)
    }

    /// Delete a driver and release it from every truck.
    pub fn delete_livreur(&self, caller: UserId, livreur_id: LivreurId) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        let livreur = self.repos.livreurs.get(livreur_id)?;
        guard(
            &principal,
            "delete_livreur",
            authorize_in_filiale(&principal, &Permission::LIVREURS_MANAGE, livreur.filiale_id),
        )?;

        for mut truck in self.repos.trucks.list()? {
            if truck.unassign(livreur_id) {
                self.repos.trucks.update(truck)?;
            }
        }
        self.repos.livreurs.delete(livreur_id)?;
        tracing::info!(%livreur_id, "livreur deleted");
        Ok(())
    }

    pub fn list_livreurs(&self, caller: UserId, filter: &LivreurFilter) -> ServiceResult<Vec<Livreur>> {
        let principal = self.principal(caller)?;
        guard(&principal, "list_livreurs", authorize(&principal, &Permission::LIVREURS_MANAGE))?;
        let scope = scope(&principal)?;
        Ok(filter
            .apply(self.repos.livreurs.list()?)
            .into_iter()
            .filter(|l| scope.is_none_or(|own| l.filiale_id == own))
            .collect())
    }

    pub fn create_truck(&self, caller: UserId, input: NewTruck) -> ServiceResult<Truck> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "create_truck",
            authorize_in_filiale(&principal, &Permission::TRUCKS_MANAGE, input.filiale_id),
        )?;
        self.repos.filiales.get(input.filiale_id)?;

        let truck = Truck::new(TruckId::new(), input, today())?;
        self.repos.trucks.insert(truck.clone())?;
        tracing::info!(truck_id = %truck.id, matricule = %truck.matricule, "truck created");
        Ok(truck)
    }

    pub fn update_truck(&self, caller: UserId, truck_id: TruckId, input: NewTruck) -> ServiceResult<Truck> {
        let principal = self.principal(caller)?;
        let mut truck = self.repos.trucks.get(truck_id)?;
        guard(
            &principal,
            "update_truck",
            authorize_in_filiale(&principal, &Permission::TRUCKS_MANAGE, truck.filiale_id),
        )?;

        truck.update(input)?;
        self.repos.trucks.update(truck.clone())?;
        tracing::info!(%truck_id, "truck updated");
        Ok(truck)
    }

    pub fn delete_truck(&self, caller: UserId, truck_id: TruckId) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        let truck = self.repos.trucks.get(truck_id)?;
        guard(
            &principal,
            "delete_truck",
            authorize_in_filiale(&principal, &Permission::TRUCKS_MANAGE, truck.filiale_id),
        )?;
        self.repos.trucks.delete(truck_id)?;
        tracing::info!(%truck_id, "truck deleted");
        Ok(())
    }

    /// Replace the drivers assigned to a truck.
    ///
    /// Every driver must belong to the truck's filiale and be active.
    pub fn assign_livreurs(
        &self,
        caller: UserId,
        truck_id: TruckId,
        livreurs: &[LivreurId],
    ) -> ServiceResult<Truck> {
        let principal = self.principal(caller)?;
        let mut truck = self.repos.trucks.get(truck_id)?;
        guard(
            &principal,
            "assign_livreurs",
            authorize_in_filiale(&principal, &Permission::TRUCKS_MANAGE, truck.filiale_id),
        )?;

        for (i, livreur_id) in livreurs.iter().enumerate() {
            let livreur = self.repos.livreurs.get(*livreur_id)?;
            if livreur.filiale_id != truck.filiale_id {
                return Err(DomainError::not_found(format!("livreur {livreur_id}")).into());
            }
            if !livreur.is_active {
                return Err(DomainError::validation(
                    format!("livreurs[{i}]"),
                    format!("livreur '{}' is inactive", livreur.fullname),
                )
                .into());
            }
        }

        truck.assign(livreurs);
        self.repos.trucks.update(truck.clone())?;
        tracing::info!(%truck_id, livreurs = truck.livreurs().len(), "livreurs assigned");
        Ok(truck)
    }

    pub fn list_trucks(&self, caller: UserId, filter: &TruckFilter) -> ServiceResult<Vec<Truck>> {
        let principal = self.principal(caller)?;
        guard(&principal, "list_trucks", authorize(&principal, &Permission::TRUCKS_MANAGE))?;
        let scope = scope(&principal)?;
        Ok(filter
            .apply(self.repos.trucks.list()?)
            .into_iter()
            .filter(|t| scope.is_none_or(|own| t.filiale_id == own))
            .collect())
    }
}
